//! The `copycat init` command.

use anyhow::Result;

pub fn execute() -> Result<()> {
    if std::path::Path::new("copycat.toml").exists() {
        println!("copycat.toml already exists, skipping.");
    } else {
        std::fs::write("copycat.toml", SAMPLE_CONFIG)?;
        println!("Created copycat.toml");
    }

    println!("\nNext steps:");
    println!("  1. Point corpus_path at your submissions and list the assignments");
    println!("  2. Run: copycat validate");
    println!("  3. Run: copycat extract");
    println!("  4. Run: copycat cluster --assignment hw1 --candidates matches.json");

    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# copycat configuration

corpus_path = "."
roster_file = "semesters.csv"
students_file = "students.txt"
partner_file = "partners.txt"
input = "tar"
extract_timeout_secs = 60

[assignments.hw1]
allow_partners = true
files = ["main.c"]

[assignments.essay]
allow_partners = false
files = ["essay.txt"]
"#;
