//! This is a basic example with flags, a valued option and a positional.
use optbind::Parser;

fn main() -> Result<(), optbind::Error> {
    let mut verbose = false;
    let mut shout = false;
    let mut repeat = 1u32;
    let mut message = String::from("hello");

    let mut parser = Parser::new();
    parser.flag(&mut verbose, Some('v'), Some("verbose"), "explain what happens")?;
    parser.flag(&mut shout, None, Some("shout"), "shout the message")?;
    parser.option(
        &mut repeat,
        Some('n'),
        Some("repeat"),
        "print the message this many times",
        None,
    )?;
    parser.argument(&mut message, "message", "the message to print", false)?;
    parser.parse_env_or_exit();
    drop(parser);

    if verbose {
        eprintln!("printing {} time(s)", repeat);
    }
    for _ in 0..repeat {
        if shout {
            println!("{}", message.to_uppercase());
        } else {
            println!("{}", message);
        }
    }
    Ok(())
}
