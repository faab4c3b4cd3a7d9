use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use shared::domain::{Gender, NewStudent, StudentId};
use storage::{InsertOutcome, Storage};

#[derive(Parser, Debug)]
struct Cli {
    #[arg(long, env = "DATABASE_URL", default_value = "sqlite://./data/students.db")]
    database_url: String,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Insert a handful of sample students, skipping emails already present.
    Seed,
    List,
    Add {
        name: String,
        email: String,
        gender: Gender,
    },
    Delete {
        student_id: i64,
    },
}

const SEED_STUDENTS: [(&str, &str, Gender); 4] = [
    ("Maria Jones", "maria.jones@example.com", Gender::Female),
    ("Ali Hassan", "ali.hassan@example.com", Gender::Male),
    ("Sam Rivera", "sam.rivera@example.com", Gender::Other),
    ("Tom", "tom@example.com", Gender::Male),
];

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let storage = Storage::new(&cli.database_url).await?;

    match cli.command {
        Command::Seed => {
            let inserted = seed(&storage).await?;
            println!("seeded {inserted} students");
        }
        Command::List => {
            for student in storage.list_students().await? {
                println!(
                    "{}\t{}\t{}\t{}",
                    student.id, student.name, student.email, student.gender
                );
            }
        }
        Command::Add {
            name,
            email,
            gender,
        } => {
            let outcome = storage
                .insert_student(&NewStudent {
                    name,
                    email: email.clone(),
                    gender,
                })
                .await?;
            match outcome {
                InsertOutcome::Inserted(student_id) => {
                    println!("created student_id={student_id}")
                }
                InsertOutcome::EmailTaken => bail!("Email {email} taken"),
            }
        }
        Command::Delete { student_id } => {
            if !storage.delete_student(StudentId(student_id)).await? {
                bail!("Student with id {student_id} does not exists");
            }
            println!("deleted student_id={student_id}");
        }
    }

    Ok(())
}

async fn seed(storage: &Storage) -> Result<usize> {
    let mut inserted = 0;
    for (name, email, gender) in SEED_STUDENTS {
        let outcome = storage
            .insert_student(&NewStudent {
                name: name.to_string(),
                email: email.to_string(),
                gender,
            })
            .await?;
        if let InsertOutcome::Inserted(_) = outcome {
            inserted += 1;
        }
    }
    Ok(inserted)
}

#[cfg(test)]
#[path = "tests/main_tests.rs"]
mod tests;
