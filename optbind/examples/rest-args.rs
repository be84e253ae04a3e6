//! This example demonstrates the overflow collector together with `--`.
//!
//! Try: `rest-args backup -- -rf notes.txt`
use optbind::Parser;

fn main() -> Result<(), optbind::Error> {
    let mut dry_run = false;
    let mut target = String::new();
    let mut files = Vec::<String>::new();

    let mut parser = Parser::new();
    parser.flag(&mut dry_run, Some('n'), Some("dry-run"), "do not touch anything")?;
    parser.argument(&mut target, "target", "where the files go", true)?;
    parser.rest(&mut files, "file");
    parser.parse_env_or_exit();
    drop(parser);

    println!("target: {}", target);
    for file in &files {
        println!("file: {}", file);
    }
    if dry_run {
        println!("(dry run, nothing copied)");
    }
    Ok(())
}
