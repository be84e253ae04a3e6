//! This example shows options that accept several values.
use optbind::Parser;

fn main() -> Result<(), optbind::Error> {
    let mut window = [640i32, 480];
    let mut defines = Vec::<String>::new();

    let mut parser = Parser::new();
    parser.option_array(
        &mut window,
        Some('w'),
        Some("window"),
        "width and height",
        Some("N"),
    )?;
    parser.option_list(
        &mut defines,
        Some('D'),
        Some("define"),
        "add a definition, may be given several times",
        None,
    )?;
    parser.parse_env_or_exit();
    drop(parser);

    println!("window: {}x{}", window[0], window[1]);
    for define in &defines {
        println!("define: {}", define);
    }
    Ok(())
}
