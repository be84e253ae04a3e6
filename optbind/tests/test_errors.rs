use std::error::Error as _;

use optbind::{Error, ErrorKind, Flag, Name, Parser};

#[test]
fn test_unrecognized_long_option() -> Result<(), Error> {
    let mut num = 0i32;
    let mut parser = Parser::new();
    parser.set_flag(Flag::ErrorMessages, false);
    parser.option(&mut num, Some('n'), Some("number"), "", None)?;

    let err = parser.parse(["prog", "--nope"]).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UnrecognizedOption);
    assert_eq!(err.to_string(), "unrecognized option `--nope'");
    Ok(())
}

#[test]
fn test_unrecognized_short_option() -> Result<(), Error> {
    let mut num = 0i32;
    let mut parser = Parser::new();
    parser.set_flag(Flag::ErrorMessages, false);
    parser.option(&mut num, Some('n'), Some("number"), "", None)?;

    let err = parser.parse(["prog", "-x"]).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UnrecognizedOption);
    assert_eq!(err.to_string(), "invalid option -- x");
    Ok(())
}

#[test]
fn test_ambiguous_abbreviation() -> Result<(), Error> {
    let (mut bint, mut binteger) = (0i32, 0i32);
    let mut parser = Parser::new();
    parser.set_flag(Flag::Abbreviations, true);
    parser.set_flag(Flag::ErrorMessages, false);
    parser.option(&mut bint, None, Some("bint"), "", None)?;
    parser.option(&mut binteger, None, Some("binteger"), "", None)?;

    let err = parser.parse(["prog", "--bi", "5"]).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::AmbiguousOption);
    assert_eq!(err.to_string(), "option `--bi' is ambiguous");
    drop(parser);
    assert_eq!(bint, 0);
    assert_eq!(binteger, 0);
    Ok(())
}

#[test]
fn test_missing_value_messages() -> Result<(), Error> {
    let mut num = 0i32;
    let mut parser = Parser::new();
    parser.set_flag(Flag::ErrorMessages, false);
    parser.option(&mut num, Some('i'), Some("int"), "", None)?;

    let err = parser.parse(["prog", "--int"]).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::MissingValue);
    assert_eq!(err.to_string(), "option `--int' requires an argument");

    let err = parser.parse(["prog", "-i"]).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::MissingValue);
    assert_eq!(err.to_string(), "option requires an argument -- i");
    Ok(())
}

#[test]
fn test_option_value_may_not_look_like_an_option() -> Result<(), Error> {
    let mut num = 0i32;
    let mut parser = Parser::new();
    parser.set_flag(Flag::ErrorMessages, false);
    parser.option(&mut num, Some('i'), Some("int"), "", None)?;

    let err = parser.parse(["prog", "-i", "-5"]).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::MissingValue);
    drop(parser);
    assert_eq!(num, 0);
    Ok(())
}

#[test]
fn test_multi_value_arity_failures() -> Result<(), Error> {
    // not enough elements left
    let mut ints = [9i32; 3];
    let mut parser = Parser::new();
    parser.set_flag(Flag::ErrorMessages, false);
    parser.option_array(&mut ints, Some('i'), Some("ints"), "", None)?;
    let err = parser.parse(["prog", "-i", "1", "2"]).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::MissingValue);
    assert_eq!(err.to_string(), "option requires 3 arguments -- i");
    drop(parser);
    assert_eq!(ints, [9, 9, 9]);

    // a dash token inside the value window
    let mut ints = [9i32; 3];
    let mut parser = Parser::new();
    parser.set_flag(Flag::ErrorMessages, false);
    parser.option_array(&mut ints, Some('i'), Some("ints"), "", None)?;
    let err = parser.parse(["prog", "--ints", "1", "-2", "3"]).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::MissingValue);
    assert_eq!(err.to_string(), "option `--ints' requires 3 arguments");
    drop(parser);
    assert_eq!(ints, [9, 9, 9]);
    Ok(())
}

#[test]
fn test_multi_value_option_rejects_inline_form() -> Result<(), Error> {
    let mut ints = [0i32; 3];
    let mut parser = Parser::new();
    parser.set_flag(Flag::ErrorMessages, false);
    parser.option_array(&mut ints, Some('i'), Some("ints"), "", None)?;

    let err = parser.parse(["prog", "--ints=1"]).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::MissingValue);

    let err = parser.parse(["prog", "-i1"]).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::MissingValue);
    Ok(())
}

#[test]
fn test_empty_inline_value() -> Result<(), Error> {
    let mut num = 0i32;
    let mut parser = Parser::new();
    parser.set_flag(Flag::ErrorMessages, false);
    parser.option(&mut num, Some('i'), Some("int"), "", None)?;

    let err = parser.parse(["prog", "--int="]).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::MissingValue);
    assert_eq!(err.to_string(), "option `--int' requires an argument");
    Ok(())
}

#[test]
fn test_invalid_value_carries_source() -> Result<(), Error> {
    let mut num = 0i32;
    let mut parser = Parser::new();
    parser.set_flag(Flag::ErrorMessages, false);
    parser.option(&mut num, Some('i'), Some("int"), "", None)?;

    let err = parser.parse(["prog", "--int=abc"]).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidValue);
    assert_eq!(err.name(), Some(&Name::Long("int".to_string())));
    assert_eq!(err.value(), Some("abc"));
    assert!(err.source().is_some());
    assert_eq!(err.to_string(), "invalid value for `--int'");
    assert_eq!(
        format!("{:#}", err),
        "invalid value for `--int': \"abc\" (invalid digit found in string)"
    );
    Ok(())
}

#[test]
fn test_invalid_positional_value() -> Result<(), Error> {
    let mut num = 0i32;
    let mut parser = Parser::new();
    parser.set_flag(Flag::ErrorMessages, false);
    parser.argument(&mut num, "count", "", true)?;

    let err = parser.parse(["prog", "many"]).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidValue);
    assert_eq!(err.name(), Some(&Name::Positional("count".to_string())));
    assert_eq!(err.to_string(), "invalid value for argument `count'");
    Ok(())
}

#[test]
fn test_unexpected_argument_without_collector() -> Result<(), Error> {
    let mut verbose = false;
    let mut parser = Parser::new();
    parser.set_flag(Flag::ErrorMessages, false);
    parser.flag(&mut verbose, Some('v'), None, "")?;

    let err = parser.parse(["prog", "stray"]).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UnexpectedArgument);
    assert_eq!(err.value(), Some("stray"));
    assert_eq!(err.to_string(), "unrecognized argument `stray'");
    Ok(())
}

#[test]
fn test_missing_required_message() -> Result<(), Error> {
    let mut path = String::new();
    let mut parser = Parser::new();
    parser.set_flag(Flag::ErrorMessages, false);
    parser.argument(&mut path, "path", "", true)?;

    let err = parser.parse(["prog"]).unwrap_err();
    assert_eq!(err.to_string(), "missing required argument `path'");
    Ok(())
}

#[test]
fn test_diagnostics_go_to_the_sink() {
    let mut sink = Vec::new();
    {
        let mut num = 0i32;
        let mut parser = Parser::new();
        parser.set_diagnostic_sink(&mut sink);
        parser.option(&mut num, Some('i'), Some("int"), "", None).unwrap();
        let err = parser.parse(["prog", "--nope"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnrecognizedOption);
    }
    let text = String::from_utf8(sink).unwrap();
    assert!(text.starts_with("prog: unrecognized option `--nope'\n"));
    assert!(text.contains("Usage: prog [options]"));
}

#[test]
fn test_each_missing_required_is_reported() {
    let mut sink = Vec::new();
    {
        let (mut a, mut b) = (0i32, 0i32);
        let mut parser = Parser::new();
        parser.set_diagnostic_sink(&mut sink);
        parser.argument(&mut a, "a", "", true).unwrap();
        parser.argument(&mut b, "b", "", true).unwrap();
        let err = parser.parse(["prog"]).unwrap_err();
        // the returned error names the first missing argument
        assert_eq!(err.name(), Some(&Name::Positional("a".to_string())));
    }
    let text = String::from_utf8(sink).unwrap();
    assert!(text.contains("prog: missing required argument `a'"));
    assert!(text.contains("prog: missing required argument `b'"));
}

#[test]
fn test_suppressed_diagnostics_write_nothing() {
    let mut sink = Vec::new();
    {
        let mut verbose = false;
        let mut parser = Parser::new();
        parser.set_diagnostic_sink(&mut sink);
        parser.set_flag(Flag::ErrorMessages, false);
        parser.flag(&mut verbose, Some('v'), None, "").unwrap();
        let err = parser.parse(["prog", "--nope"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnrecognizedOption);
    }
    assert!(sink.is_empty());
}
