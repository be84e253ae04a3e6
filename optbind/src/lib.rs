//! This crate implements a declarative command line parser: options and
//! positional arguments are registered up front against caller-owned
//! destination variables, and a single parse pass binds, converts and
//! validates the whole argument vector.
//!
//! The goal of this crate is that it stays small, dependency free and
//! predictable: registration describes the surface once, parsing walks the
//! command line once, and every failure is an ordinary [`Error`] value.
//!
//! # Example
//!
//! Registration happens on the [`Parser`] type, parsing via [`Parser::parse`]:
//!
//! ```
//! use optbind::{Outcome, Parser};
//!
//! fn main() -> Result<(), optbind::Error> {
//!     let mut verbose = false;
//!     let mut count = 1u32;
//!     let mut path = String::new();
//!
//!     let mut parser = Parser::new();
//!     parser.flag(&mut verbose, Some('v'), Some("verbose"), "enable verbose output")?;
//!     parser.option(&mut count, Some('c'), Some("count"), "number of repetitions", None)?;
//!     parser.argument(&mut path, "path", "file to process", true)?;
//!
//!     let outcome = parser.parse(["demo", "-v", "--count=3", "input.txt"])?;
//!     drop(parser);
//!
//!     assert_eq!(outcome, Outcome::Parsed);
//!     assert!(verbose);
//!     assert_eq!(count, 3);
//!     assert_eq!(path, "input.txt");
//!     Ok(())
//! }
//! ```
//!
//! Here is what's happening:
//!
//! * [`Parser::new`] creates an empty parser that already knows `--help`.
//! * [`Parser::flag`], [`Parser::option`] and [`Parser::argument`] register
//!   destinations.  The parser does not own any parsed data; it writes
//!   through the `&mut` borrows it was given, so the borrows end when the
//!   parser is dropped.
//! * [`Parser::parse`] consumes an argument vector whose first element is
//!   the program name and dispatches every following element.
//!
//! # Behavior
//!
//! Options and positional arguments may be freely interleaved.  Short flags
//! without values group into clusters (`-abc` is `-a -b -c`), values attach
//! inline (`-i10`, `--int=10`) or as following elements (`-i 10`), and the
//! literal `--` ends option parsing for the rest of the command line.
//!
//! With abbreviations enabled (see [`Flag::Abbreviations`]) a long option
//! can be given by any unambiguous prefix, e.g. `--fo` for `--foobar`.  The
//! flip side is that short option grouping becomes unavailable: a short
//! token with trailing characters is then resolved as a long name instead.
//!
//! # Limitations and Error Handling
//!
//! A parse stops at the first error; there is no recovery or
//! resynchronization.  Destinations bound before the failing element keep
//! their new values, so a failed parse can leave a partially updated
//! configuration behind.  Callers that need transactional behavior should
//! parse into scratch variables first.
use std::env;
use std::error;
use std::fmt;
use std::io::{self, Write};
use std::process;
use std::str::FromStr;

/// Identifies a registered option or positional argument in messages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Name {
    /// A single character option name, e.g. `v` for `-v`.
    Short(char),
    /// A long option name, e.g. `verbose` for `--verbose`.
    Long(String),
    /// The display name of a positional argument.
    Positional(String),
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Name::Short(c) => write!(f, "-{}", c),
            Name::Long(l) => write!(f, "--{}", l),
            Name::Positional(n) => write!(f, "`{}'", n),
        }
    }
}

/// Classifies a registration or parsing error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum ErrorKind {
    /// A registration reused an already registered short or long name.
    DuplicateOption,
    /// A registration supplied neither a short nor a long name.
    MissingName,
    /// A registration declared a value-taking entry with zero values.
    InvalidArity,
    /// A required positional argument was registered after an optional one.
    RequiredAfterOptional,
    /// An option name on the command line matched no registration.
    UnrecognizedOption,
    /// An abbreviated long option matched more than one registration.
    AmbiguousOption,
    /// Fewer values than declared were available, or a value looked like
    /// an option.
    MissingValue,
    /// A value could not be converted to the destination type.
    InvalidValue,
    /// A positional token arrived with no slot and no overflow collector.
    UnexpectedArgument,
    /// The command line ended before a required positional was bound.
    MissingArgument,
}

struct ErrorRepr {
    kind: ErrorKind,
    name: Option<Name>,
    value: Option<String>,
    nargs: usize,
    source: Option<Box<dyn error::Error + Send + Sync + 'static>>,
}

/// The error type for registration and parsing.
///
/// Carries the error classification ([`ErrorKind`]), the offending
/// option/argument name where one is known, the offending raw value for
/// conversion failures, and the underlying conversion error as
/// [`std::error::Error::source`].
pub struct Error {
    repr: Box<ErrorRepr>,
}

impl Error {
    fn new(kind: ErrorKind) -> Error {
        Error {
            repr: Box::new(ErrorRepr {
                kind,
                name: None,
                value: None,
                nargs: 0,
                source: None,
            }),
        }
    }

    fn with_name(mut self, name: Name) -> Error {
        self.repr.name = Some(name);
        self
    }

    fn with_value(mut self, value: impl Into<String>) -> Error {
        self.repr.value = Some(value.into());
        self
    }

    fn with_nargs(mut self, nargs: usize) -> Error {
        self.repr.nargs = nargs;
        self
    }

    fn with_source(mut self, source: Box<dyn error::Error + Send + Sync + 'static>) -> Error {
        self.repr.source = Some(source);
        self
    }

    /// Returns the error classification.
    pub fn kind(&self) -> ErrorKind {
        self.repr.kind
    }

    /// Returns the name of the option or argument the error refers to.
    pub fn name(&self) -> Option<&Name> {
        self.repr.name.as_ref()
    }

    /// Returns the raw value that caused the error, if one is known.
    pub fn value(&self) -> Option<&str> {
        self.repr.value.as_deref()
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let repr = &*self.repr;
        match (repr.kind, repr.name.as_ref()) {
            (ErrorKind::DuplicateOption, Some(Name::Short(c))) => {
                write!(f, "duplicate option -- {}", c)
            }
            (ErrorKind::DuplicateOption, Some(Name::Long(l))) => {
                write!(f, "duplicate option `--{}'", l)
            }
            (ErrorKind::DuplicateOption, _) => f.write_str("duplicate option"),
            (ErrorKind::MissingName, _) => f.write_str("option needs a short or a long name"),
            (ErrorKind::InvalidArity, Some(Name::Positional(n))) => {
                write!(f, "argument `{}' must take at least one value", n)
            }
            (ErrorKind::InvalidArity, Some(name)) => {
                write!(f, "option {} must take at least one value", name)
            }
            (ErrorKind::InvalidArity, None) => f.write_str("at least one value required"),
            (ErrorKind::RequiredAfterOptional, Some(Name::Positional(n))) => {
                write!(f, "required argument `{}' cannot follow optional arguments", n)
            }
            (ErrorKind::RequiredAfterOptional, _) => {
                f.write_str("required argument cannot follow optional arguments")
            }
            (ErrorKind::UnrecognizedOption, Some(Name::Short(c))) => {
                write!(f, "invalid option -- {}", c)
            }
            (ErrorKind::UnrecognizedOption, Some(Name::Long(l))) => {
                write!(f, "unrecognized option `--{}'", l)
            }
            (ErrorKind::UnrecognizedOption, _) => f.write_str("unrecognized option"),
            (ErrorKind::AmbiguousOption, Some(Name::Long(l))) => {
                write!(f, "option `--{}' is ambiguous", l)
            }
            (ErrorKind::AmbiguousOption, _) => f.write_str("ambiguous option"),
            (ErrorKind::MissingValue, Some(Name::Short(c))) => {
                if repr.nargs > 1 {
                    write!(f, "option requires {} arguments -- {}", repr.nargs, c)
                } else {
                    write!(f, "option requires an argument -- {}", c)
                }
            }
            (ErrorKind::MissingValue, Some(Name::Long(l))) => {
                if repr.nargs > 1 {
                    write!(f, "option `--{}' requires {} arguments", l, repr.nargs)
                } else {
                    write!(f, "option `--{}' requires an argument", l)
                }
            }
            (ErrorKind::MissingValue, Some(Name::Positional(n))) => {
                if repr.nargs > 1 {
                    write!(f, "argument `{}' requires {} arguments", n, repr.nargs)
                } else {
                    write!(f, "argument `{}' requires an argument", n)
                }
            }
            (ErrorKind::MissingValue, None) => f.write_str("missing argument"),
            (ErrorKind::InvalidValue, name) => {
                match name {
                    Some(Name::Positional(n)) => write!(f, "invalid value for argument `{}'", n)?,
                    Some(name) => write!(f, "invalid value for `{}'", name)?,
                    None => f.write_str("invalid value")?,
                }
                if f.alternate() {
                    if let Some(value) = &repr.value {
                        write!(f, ": {:?}", value)?;
                    }
                    if let Some(source) = &repr.source {
                        write!(f, " ({})", source)?;
                    }
                }
                Ok(())
            }
            (ErrorKind::UnexpectedArgument, _) => match &repr.value {
                Some(value) => write!(f, "unrecognized argument `{}'", value),
                None => f.write_str("unrecognized argument"),
            },
            (ErrorKind::MissingArgument, Some(Name::Positional(n))) => {
                write!(f, "missing required argument `{}'", n)
            }
            (ErrorKind::MissingArgument, _) => f.write_str("missing required argument"),
        }
    }
}

impl fmt::Debug for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Error")
            .field("kind", &self.kind())
            .field("name", &self.repr.name)
            .field("value", &self.repr.value)
            .finish()
    }
}

impl error::Error for Error {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self.repr.source {
            Some(ref source) => Some(&**source),
            None => None,
        }
    }
}

/// The non-error result of a parse call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The whole vector was dispatched and every required argument bound.
    Parsed,
    /// The help option was triggered; display usage and stop instead of
    /// acting on the bound values.
    Help,
}

/// Parser behavior flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flag {
    /// When set, parse failures write a diagnostic and the usage text to
    /// the diagnostic sink.
    ///
    /// **Default:** flag is set
    ErrorMessages,
    /// When set, long options resolve by unambiguous prefix.  Short option
    /// grouping and inline short values become unavailable as a side
    /// effect: a short-looking token with trailing characters, or whose
    /// character matches no registered short name, is resolved as a long
    /// name instead.
    ///
    /// **Default:** flag is unset
    Abbreviations,
}

impl Flag {
    fn as_u8(self) -> u8 {
        match self {
            Flag::ErrorMessages => 1,
            Flag::Abbreviations => 2,
        }
    }
}

type SetValue<'a> = Box<dyn FnMut(&[&str]) -> Result<(), Error> + 'a>;

/// How a triggered option writes through to its destination.
enum Binder<'a> {
    /// Invoked with exactly `nargs` raw tokens.
    Value(SetValue<'a>),
    /// The implicit help switch; recorded in parser state instead.
    Help,
}

struct Opt<'a> {
    short: Option<char>,
    long: Option<String>,
    help: String,
    value_name: String,
    nargs: usize,
    binder: Binder<'a>,
}

struct Pos<'a> {
    name: String,
    help: String,
    required: bool,
    nargs: usize,
    set_value: SetValue<'a>,
}

struct Overflow<'a> {
    name: String,
    values: &'a mut Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LongMatch {
    Found(usize),
    Missing,
    Ambiguous,
}

/// A declarative command line parser.
///
/// The parser holds `&mut` borrows of the destinations registered with it,
/// so the borrows last until the parser is dropped.  Registration builds up
/// the option and argument tables; [`parse`](Self::parse) walks an argument
/// vector once and writes through the registered destinations.
pub struct Parser<'a> {
    options: Vec<Opt<'a>>,
    positionals: Vec<Pos<'a>>,
    overflow: Option<Overflow<'a>>,
    sink: Option<Box<dyn Write + 'a>>,
    flags: u8,
    show_help: bool,
}

impl fmt::Debug for Parser<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Parser")
            .field("options", &self.options.len())
            .field("arguments", &self.positionals.len())
            .finish()
    }
}

impl Default for Parser<'_> {
    fn default() -> Self {
        Parser::new()
    }
}

impl<'a> Parser<'a> {
    /// Creates a parser with the implicit `--help` option registered.
    pub fn new() -> Parser<'a> {
        let mut parser = Parser {
            options: Vec::new(),
            positionals: Vec::new(),
            overflow: None,
            sink: None,
            flags: Flag::ErrorMessages.as_u8(),
            show_help: false,
        };
        parser.options.push(Opt {
            short: None,
            long: Some("help".to_string()),
            help: "Display this message".to_string(),
            value_name: String::new(),
            nargs: 0,
            binder: Binder::Help,
        });
        parser
    }

    /// Check if a parsing [`Flag`] is currently set.
    #[inline]
    pub fn get_flag(&self, flag: Flag) -> bool {
        self.flags & flag.as_u8() != 0
    }

    /// Sets or unsets a parsing [`Flag`].
    #[inline]
    pub fn set_flag(&mut self, flag: Flag, yes: bool) {
        if yes {
            self.flags |= flag.as_u8();
        } else {
            self.flags &= !flag.as_u8();
        }
    }

    /// Redirects diagnostic and usage output.
    ///
    /// Without a sink, diagnostics go to stderr.  Output is suppressed
    /// entirely by clearing [`Flag::ErrorMessages`].
    pub fn set_diagnostic_sink<W: Write + 'a>(&mut self, sink: W) {
        self.sink = Some(Box::new(sink));
    }

    /// Registers a boolean flag.
    ///
    /// The destination is set to `true` every time the flag is seen on the
    /// command line; it takes no value.
    pub fn flag(
        &mut self,
        dest: &'a mut bool,
        short: Option<char>,
        long: Option<&str>,
        help: &str,
    ) -> Result<(), Error> {
        self.register_option(
            short,
            long,
            help,
            None,
            0,
            Binder::Value(Box::new(move |_: &[&str]| {
                *dest = true;
                Ok(())
            })),
        )
    }

    /// Registers an option taking one value.
    ///
    /// The value converts via [`FromStr`]; on repeated occurrences the last
    /// one wins.  `value_name` overrides the display label used in the
    /// usage text (the uppercased option name by default).
    pub fn option<T>(
        &mut self,
        dest: &'a mut T,
        short: Option<char>,
        long: Option<&str>,
        help: &str,
        value_name: Option<&str>,
    ) -> Result<(), Error>
    where
        T: FromStr,
        T::Err: Into<Box<dyn error::Error + Send + Sync + 'static>>,
    {
        self.register_option(
            short,
            long,
            help,
            value_name,
            1,
            Binder::Value(Box::new(move |values: &[&str]| {
                *dest = convert(values[0])?;
                Ok(())
            })),
        )
    }

    /// Registers an option taking one value per occurrence, all collected.
    pub fn option_list<T>(
        &mut self,
        dest: &'a mut Vec<T>,
        short: Option<char>,
        long: Option<&str>,
        help: &str,
        value_name: Option<&str>,
    ) -> Result<(), Error>
    where
        T: FromStr,
        T::Err: Into<Box<dyn error::Error + Send + Sync + 'static>>,
    {
        self.register_option(
            short,
            long,
            help,
            value_name,
            1,
            Binder::Value(Box::new(move |values: &[&str]| {
                dest.push(convert(values[0])?);
                Ok(())
            })),
        )
    }

    /// Registers an option taking exactly `N` values.
    ///
    /// Values convert element-wise in order and conversion stops at the
    /// first failing one, so a conversion failure can leave earlier array
    /// elements already overwritten.  Multi-value options cannot use the
    /// inline `--name=value` form.
    pub fn option_array<T, const N: usize>(
        &mut self,
        dest: &'a mut [T; N],
        short: Option<char>,
        long: Option<&str>,
        help: &str,
        value_name: Option<&str>,
    ) -> Result<(), Error>
    where
        T: FromStr,
        T::Err: Into<Box<dyn error::Error + Send + Sync + 'static>>,
    {
        if N == 0 {
            return self.reject_arity(display_name(short, long));
        }
        self.register_option(
            short,
            long,
            help,
            value_name,
            N,
            Binder::Value(Box::new(move |values: &[&str]| {
                for (slot, raw) in dest.iter_mut().zip(values) {
                    *slot = convert(raw)?;
                }
                Ok(())
            })),
        )
    }

    /// Registers a positional argument taking one value.
    ///
    /// Required arguments must be registered before optional ones; a
    /// violating registration is rejected with
    /// [`ErrorKind::RequiredAfterOptional`].
    pub fn argument<T>(
        &mut self,
        dest: &'a mut T,
        name: &str,
        help: &str,
        required: bool,
    ) -> Result<(), Error>
    where
        T: FromStr,
        T::Err: Into<Box<dyn error::Error + Send + Sync + 'static>>,
    {
        self.register_argument(
            name,
            help,
            required,
            1,
            Box::new(move |values: &[&str]| {
                *dest = convert(values[0])?;
                Ok(())
            }),
        )
    }

    /// Registers a positional argument taking exactly `N` consecutive values.
    pub fn argument_array<T, const N: usize>(
        &mut self,
        dest: &'a mut [T; N],
        name: &str,
        help: &str,
        required: bool,
    ) -> Result<(), Error>
    where
        T: FromStr,
        T::Err: Into<Box<dyn error::Error + Send + Sync + 'static>>,
    {
        if N == 0 {
            return self.reject_arity(Some(Name::Positional(name.to_string())));
        }
        self.register_argument(
            name,
            help,
            required,
            N,
            Box::new(move |values: &[&str]| {
                for (slot, raw) in dest.iter_mut().zip(values) {
                    *slot = convert(raw)?;
                }
                Ok(())
            }),
        )
    }

    /// Registers the collector for positional tokens beyond all declared
    /// arguments.
    ///
    /// Tokens land in `dest` verbatim, in input order.  Only the first call
    /// takes effect; later calls are ignored.  Without a collector, excess
    /// positional tokens fail the parse.
    pub fn rest(&mut self, dest: &'a mut Vec<String>, name: &str) {
        if self.overflow.is_none() {
            self.overflow = Some(Overflow {
                name: name.to_string(),
                values: dest,
            });
        }
    }

    fn reject_arity(&mut self, name: Option<Name>) -> Result<(), Error> {
        let err = match name {
            Some(name) => Error::new(ErrorKind::InvalidArity).with_name(name),
            None => Error::new(ErrorKind::InvalidArity),
        };
        self.report(None, &err);
        Err(err)
    }

    fn register_option(
        &mut self,
        short: Option<char>,
        long: Option<&str>,
        help: &str,
        value_name: Option<&str>,
        nargs: usize,
        binder: Binder<'a>,
    ) -> Result<(), Error> {
        let long = long.filter(|l| !l.is_empty());
        if let Err(err) = self.check_names(short, long) {
            self.report(None, &err);
            return Err(err);
        }
        let value_name = match value_name {
            Some(label) => label.to_string(),
            None if nargs > 0 => default_value_name(short, long),
            None => String::new(),
        };
        self.options.push(Opt {
            short,
            long: long.map(str::to_string),
            help: help.to_string(),
            value_name,
            nargs,
            binder,
        });
        Ok(())
    }

    fn check_names(&self, short: Option<char>, long: Option<&str>) -> Result<(), Error> {
        if short.is_none() && long.is_none() {
            return Err(Error::new(ErrorKind::MissingName));
        }
        if let Some(c) = short {
            if self.options.iter().any(|opt| opt.short == Some(c)) {
                return Err(Error::new(ErrorKind::DuplicateOption).with_name(Name::Short(c)));
            }
        }
        if let Some(l) = long {
            if self.options.iter().any(|opt| opt.long.as_deref() == Some(l)) {
                return Err(
                    Error::new(ErrorKind::DuplicateOption).with_name(Name::Long(l.to_string()))
                );
            }
        }
        Ok(())
    }

    fn register_argument(
        &mut self,
        name: &str,
        help: &str,
        required: bool,
        nargs: usize,
        set_value: SetValue<'a>,
    ) -> Result<(), Error> {
        if required && self.positionals.last().is_some_and(|pos| !pos.required) {
            let err = Error::new(ErrorKind::RequiredAfterOptional)
                .with_name(Name::Positional(name.to_string()));
            self.report(None, &err);
            return Err(err);
        }
        self.positionals.push(Pos {
            name: name.to_string(),
            help: help.to_string(),
            required,
            nargs,
            set_value,
        });
        Ok(())
    }

    /// Parses an argument vector.
    ///
    /// The first element is the program name; it prefixes diagnostics and
    /// is otherwise skipped.  On success the registered destinations hold
    /// the bound values and the returned [`Outcome`] tells whether the help
    /// option was triggered.  The first offending element aborts the parse;
    /// destinations bound before it keep their values.
    pub fn parse<I, S>(&mut self, cmdline: I) -> Result<Outcome, Error>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let argv: Vec<String> = cmdline.into_iter().map(Into::into).collect();
        let prog = argv.first().cloned().unwrap_or_default();
        self.show_help = false;
        let mut terminated = false;
        let mut cursor = 0usize;
        let mut i = 1usize;

        while i < argv.len() {
            let arg = argv[i].as_str();
            let step = if !terminated && arg.len() > 1 && arg.starts_with('-') {
                if arg == "--" {
                    terminated = true;
                    i += 1;
                    continue;
                }
                let mut chars = arg.chars().skip(1);
                let leads_long = match chars.next() {
                    Some('-') => true,
                    Some(c) => {
                        self.get_flag(Flag::Abbreviations)
                            && (chars.next().is_some() || self.short_index(c).is_none())
                    }
                    None => false,
                };
                if leads_long {
                    self.long_option(&argv, &mut i)
                } else {
                    self.short_option(&argv, &mut i)
                }
            } else {
                self.positional(&argv, &mut i, &mut cursor)
            };
            if let Err(err) = step {
                self.report(Some(&prog), &err);
                self.emit_usage(&prog);
                return Err(err);
            }
            i += 1;
        }

        if self.show_help {
            return Ok(Outcome::Help);
        }

        let mut missing: Vec<String> = self.positionals[cursor..]
            .iter()
            .filter(|pos| pos.required)
            .map(|pos| pos.name.clone())
            .collect();
        if !missing.is_empty() {
            for name in &missing {
                let err = Error::new(ErrorKind::MissingArgument)
                    .with_name(Name::Positional(name.clone()));
                self.report(Some(&prog), &err);
            }
            self.emit_usage(&prog);
            return Err(Error::new(ErrorKind::MissingArgument)
                .with_name(Name::Positional(missing.remove(0))));
        }

        Ok(Outcome::Parsed)
    }

    /// Parses the command line of the current process.
    pub fn parse_env(&mut self) -> Result<Outcome, Error> {
        self.parse(env::args())
    }

    /// Parses the command line of the current process and terminates on
    /// anything but a plain success.
    ///
    /// A triggered help option prints the usage text to stdout and exits
    /// with status 0.  A parse error (its diagnostics already emitted)
    /// exits with a nonzero status.
    pub fn parse_env_or_exit(&mut self) {
        let argv: Vec<String> = env::args().collect();
        let prog = argv.first().cloned().unwrap_or_default();
        match self.parse(argv) {
            Ok(Outcome::Parsed) => {}
            Ok(Outcome::Help) => {
                let _ = self.usage(&mut io::stdout(), &prog);
                process::exit(0);
            }
            Err(_) => process::exit(1),
        }
    }

    fn short_index(&self, c: char) -> Option<usize> {
        self.options.iter().position(|opt| opt.short == Some(c))
    }

    fn long_index(&self, name: &str) -> Option<usize> {
        self.options
            .iter()
            .position(|opt| opt.long.as_deref() == Some(name))
    }

    fn long_prefix_index(&self, name: &str) -> LongMatch {
        let mut found = None;
        let mut ambiguous = false;
        for (index, opt) in self.options.iter().enumerate() {
            let long = match opt.long.as_deref() {
                Some(long) => long,
                None => continue,
            };
            if !long.starts_with(name) {
                continue;
            }
            if long.len() == name.len() {
                // a full-length match always wins over partial ones
                return LongMatch::Found(index);
            }
            if found.is_none() {
                found = Some(index);
            } else {
                ambiguous = true;
            }
        }
        if ambiguous {
            LongMatch::Ambiguous
        } else {
            match found {
                Some(index) => LongMatch::Found(index),
                None => LongMatch::Missing,
            }
        }
    }

    fn trigger(&mut self, index: usize, values: &[&str]) -> Result<(), Error> {
        match &mut self.options[index].binder {
            Binder::Value(set_value) => set_value(values),
            Binder::Help => {
                self.show_help = true;
                Ok(())
            }
        }
    }

    fn long_option(&mut self, argv: &[String], i: &mut usize) -> Result<(), Error> {
        let token = argv[*i].as_str();
        let body = match token.strip_prefix("--") {
            Some(body) => body,
            None => token.strip_prefix('-').unwrap_or(token),
        };
        let (name, inline) = match body.split_once('=') {
            Some((name, value)) => (name, Some(value)),
            None => (body, None),
        };

        let index = if self.get_flag(Flag::Abbreviations) {
            match self.long_prefix_index(name) {
                LongMatch::Found(index) => index,
                LongMatch::Ambiguous => {
                    return Err(Error::new(ErrorKind::AmbiguousOption)
                        .with_name(Name::Long(name.to_string())))
                }
                LongMatch::Missing => {
                    return Err(Error::new(ErrorKind::UnrecognizedOption)
                        .with_name(Name::Long(name.to_string())))
                }
            }
        } else {
            match self.long_index(name) {
                Some(index) => index,
                None => {
                    return Err(Error::new(ErrorKind::UnrecognizedOption)
                        .with_name(Name::Long(name.to_string())))
                }
            }
        };

        let nargs = self.options[index].nargs;
        if nargs == 0 {
            // a stray `=value` on a flag is ignored
            return self.trigger(index, &[]);
        }

        if let Some(value) = inline {
            if nargs > 1 {
                return Err(Error::new(ErrorKind::MissingValue)
                    .with_name(Name::Long(name.to_string()))
                    .with_nargs(nargs));
            }
            if value.is_empty() {
                return Err(Error::new(ErrorKind::MissingValue)
                    .with_name(Name::Long(name.to_string()))
                    .with_nargs(1));
            }
            return self
                .trigger(index, &[value])
                .map_err(|err| err.with_name(Name::Long(name.to_string())));
        }

        // values may not look like options
        if *i + nargs >= argv.len() {
            return Err(Error::new(ErrorKind::MissingValue)
                .with_name(Name::Long(name.to_string()))
                .with_nargs(nargs));
        }
        for n in 0..nargs {
            if argv[*i + 1 + n].starts_with('-') {
                return Err(Error::new(ErrorKind::MissingValue)
                    .with_name(Name::Long(name.to_string()))
                    .with_nargs(nargs));
            }
        }
        let values: Vec<&str> = argv[*i + 1..=*i + nargs]
            .iter()
            .map(String::as_str)
            .collect();
        let result = self
            .trigger(index, &values)
            .map_err(|err| err.with_name(Name::Long(name.to_string())));
        *i += nargs;
        result
    }

    fn short_option(&mut self, argv: &[String], i: &mut usize) -> Result<(), Error> {
        let token = argv[*i].as_str();
        let (pos, c) = match token.char_indices().nth(1) {
            Some(found) => found,
            None => {
                return Err(
                    Error::new(ErrorKind::UnrecognizedOption).with_value(token.to_string())
                )
            }
        };
        let index = match self.short_index(c) {
            Some(index) => index,
            None => {
                return Err(Error::new(ErrorKind::UnrecognizedOption).with_name(Name::Short(c)))
            }
        };

        let nargs = self.options[index].nargs;
        if nargs > 0 {
            let rest_start = pos + c.len_utf8();
            if rest_start < token.len() {
                // the remainder of the token is the value
                if nargs > 1 {
                    return Err(Error::new(ErrorKind::MissingValue)
                        .with_name(Name::Short(c))
                        .with_nargs(nargs));
                }
                return self
                    .trigger(index, &[&token[rest_start..]])
                    .map_err(|err| err.with_name(Name::Short(c)));
            }
            if *i + nargs >= argv.len() {
                return Err(Error::new(ErrorKind::MissingValue)
                    .with_name(Name::Short(c))
                    .with_nargs(nargs));
            }
            for n in 0..nargs {
                if argv[*i + 1 + n].starts_with('-') {
                    return Err(Error::new(ErrorKind::MissingValue)
                        .with_name(Name::Short(c))
                        .with_nargs(nargs));
                }
            }
            let values: Vec<&str> = argv[*i + 1..=*i + nargs]
                .iter()
                .map(String::as_str)
                .collect();
            let result = self
                .trigger(index, &values)
                .map_err(|err| err.with_name(Name::Short(c)));
            *i += nargs;
            return result;
        }

        self.trigger(index, &[])?;
        // every further character is another grouped flag
        for (_, extra) in token.char_indices().skip(2) {
            let index = match self.short_index(extra) {
                Some(index) => index,
                None => {
                    return Err(
                        Error::new(ErrorKind::UnrecognizedOption).with_name(Name::Short(extra))
                    )
                }
            };
            let nargs = self.options[index].nargs;
            if nargs > 0 {
                // options taking values cannot be grouped
                return Err(Error::new(ErrorKind::MissingValue)
                    .with_name(Name::Short(extra))
                    .with_nargs(nargs));
            }
            self.trigger(index, &[])?;
        }
        Ok(())
    }

    fn positional(
        &mut self,
        argv: &[String],
        i: &mut usize,
        cursor: &mut usize,
    ) -> Result<(), Error> {
        if *cursor >= self.positionals.len() {
            return match &mut self.overflow {
                Some(overflow) => {
                    overflow.values.push(argv[*i].clone());
                    Ok(())
                }
                None => {
                    Err(Error::new(ErrorKind::UnexpectedArgument).with_value(argv[*i].clone()))
                }
            };
        }

        let nargs = self.positionals[*cursor].nargs;
        let name = self.positionals[*cursor].name.clone();
        if *i + nargs > argv.len() {
            return Err(Error::new(ErrorKind::MissingValue)
                .with_name(Name::Positional(name))
                .with_nargs(nargs));
        }
        for n in 0..nargs {
            if argv[*i + n].starts_with('-') {
                return Err(Error::new(ErrorKind::MissingValue)
                    .with_name(Name::Positional(name))
                    .with_nargs(nargs));
            }
        }
        let values: Vec<&str> = argv[*i..*i + nargs].iter().map(String::as_str).collect();
        let slot = &mut self.positionals[*cursor];
        (slot.set_value)(&values).map_err(|err| err.with_name(Name::Positional(name)))?;
        *i += nargs - 1;
        *cursor += 1;
        Ok(())
    }

    /// Writes the usage text for the registered surface.
    pub fn usage<W: Write>(&self, out: &mut W, prog: &str) -> io::Result<()> {
        write!(out, "Usage: {}", prog)?;
        if !self.options.is_empty() {
            write!(out, " [options]")?;
        }
        for pos in &self.positionals {
            if pos.required {
                write!(out, " <{}>", pos.name)?;
            } else {
                write!(out, " [{}]", pos.name)?;
            }
        }
        if let Some(overflow) = &self.overflow {
            if overflow.name.is_empty() {
                write!(out, " [...]")?;
            } else {
                write!(out, " [{}...]", overflow.name)?;
            }
        }
        writeln!(out)?;

        if !self.positionals.is_empty() {
            writeln!(out)?;
            writeln!(out, "Arguments:")?;
            let rows: Vec<(String, &str)> = self
                .positionals
                .iter()
                .map(|pos| (pos.name.clone(), pos.help.as_str()))
                .collect();
            write_rows(out, &rows)?;
        }

        writeln!(out)?;
        writeln!(out, "Options:")?;
        let rows: Vec<(String, &str)> = self
            .options
            .iter()
            .map(|opt| (option_label(opt), opt.help.as_str()))
            .collect();
        write_rows(out, &rows)
    }

    fn report(&mut self, prog: Option<&str>, err: &Error) {
        if !self.get_flag(Flag::ErrorMessages) {
            return;
        }
        let line = match prog {
            Some(prog) => format!("{}: {}", prog, err),
            None => err.to_string(),
        };
        match &mut self.sink {
            Some(sink) => {
                let _ = writeln!(sink, "{}", line);
            }
            None => eprintln!("{}", line),
        }
    }

    fn emit_usage(&mut self, prog: &str) {
        if !self.get_flag(Flag::ErrorMessages) {
            return;
        }
        if let Some(mut sink) = self.sink.take() {
            let _ = self.usage(&mut sink, prog);
            self.sink = Some(sink);
        } else {
            let _ = self.usage(&mut io::stderr(), prog);
        }
    }
}

fn convert<T>(raw: &str) -> Result<T, Error>
where
    T: FromStr,
    T::Err: Into<Box<dyn error::Error + Send + Sync + 'static>>,
{
    raw.parse().map_err(|err: T::Err| {
        Error::new(ErrorKind::InvalidValue)
            .with_value(raw)
            .with_source(err.into())
    })
}

fn display_name(short: Option<char>, long: Option<&str>) -> Option<Name> {
    match long.filter(|l| !l.is_empty()) {
        Some(l) => Some(Name::Long(l.to_string())),
        None => short.map(Name::Short),
    }
}

fn default_value_name(short: Option<char>, long: Option<&str>) -> String {
    match long {
        Some(long) => long.to_uppercase(),
        None => match short {
            Some(short) => short.to_uppercase().to_string(),
            None => String::new(),
        },
    }
}

fn option_label(opt: &Opt<'_>) -> String {
    let mut label = match (opt.short, opt.long.as_deref()) {
        (Some(c), Some(l)) => format!("-{}, --{}", c, l),
        (Some(c), None) => format!("-{}", c),
        (None, Some(l)) => format!("--{}", l),
        (None, None) => String::new(),
    };
    for _ in 0..opt.nargs {
        label.push_str(" <");
        label.push_str(&opt.value_name);
        label.push('>');
    }
    label
}

fn write_rows<W: Write>(out: &mut W, rows: &[(String, &str)]) -> io::Result<()> {
    let width = rows.iter().map(|(left, _)| left.len()).max().unwrap_or(0);
    for (left, help) in rows {
        if help.is_empty() {
            writeln!(out, "  {}", left)?;
        } else {
            writeln!(out, "  {:width$}  {}", left, help, width = width)?;
        }
    }
    Ok(())
}
