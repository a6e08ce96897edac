//! Editor options: the `:set` system.
//!
//! | Syntax          | Effect                  |
//! |-----------------|-------------------------|
//! | `:set number`   | Enable                  |
//! | `:set nonumber` | Disable                 |
//! | `:set number!`  | Toggle                  |
//! | `:set number?`  | Query the current value |
//! | `:set`          | Show changed options    |
//! | `:set all`      | Show all options        |
//!
//! | Full name | Abbrev | Type | Default |
//! |-----------|--------|------|---------|
//! | `number`  | `nu`   | bool | true    |

/// A parsed `:set` argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SetDirective {
    /// `:set option`
    On(String),

    /// `:set nooption`
    Off(String),

    /// `:set option!`
    Toggle(String),

    /// `:set option?`
    Query(String),

    /// `:set option=value`. No option takes a value yet, so this is always
    /// rejected, but it parses so the error can name the argument.
    Assign(String, String),

    /// `:set` with no arguments.
    ShowChanged,

    /// `:set all`
    ShowAll,
}

/// Returns `true` if `name` is a known boolean option (full name or abbreviation).
#[must_use]
pub fn is_bool_option(name: &str) -> bool {
    matches!(name, "number" | "nu")
}

/// Parse the whole argument string. Empty means [`SetDirective::ShowChanged`].
#[must_use]
pub fn parse_set(args: &str) -> Vec<SetDirective> {
    let trimmed = args.trim();
    if trimmed.is_empty() {
        return vec![SetDirective::ShowChanged];
    }
    trimmed.split_whitespace().map(parse_set_arg).collect()
}

/// Parse one `:set` argument.
#[must_use]
pub fn parse_set_arg(arg: &str) -> SetDirective {
    if arg == "all" {
        return SetDirective::ShowAll;
    }
    if let Some((name, value)) = arg.split_once('=') {
        return SetDirective::Assign(name.to_string(), value.to_string());
    }
    if let Some(name) = arg.strip_suffix('?') {
        return SetDirective::Query(name.to_string());
    }
    if let Some(name) = arg.strip_suffix('!') {
        return SetDirective::Toggle(name.to_string());
    }
    // `number` itself starts with "no"; only strip when what's left is real.
    if let Some(name) = arg.strip_prefix("no") {
        if is_bool_option(name) {
            return SetDirective::Off(name.to_string());
        }
    }
    SetDirective::On(arg.to_string())
}

/// `"name"` when true, `"noname"` when false.
#[must_use]
pub fn format_bool(name: &str, value: bool) -> String {
    if value {
        name.to_string()
    } else {
        format!("no{name}")
    }
}

// ---------------------------------------------------------------------------
// Options
// ---------------------------------------------------------------------------

/// Current option values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Options {
    /// Draw the line-number gutter.
    pub number: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self { number: true }
    }
}

impl Options {
    /// Run a full `:set` argument string. Returns the message for the status
    /// line, or an error message for the first directive that fails.
    ///
    /// # Errors
    ///
    /// An unknown option name, or an assignment to a boolean option.
    pub fn set(&mut self, args: &str) -> Result<Option<String>, String> {
        let mut message = None;
        for directive in parse_set(args) {
            if let Some(msg) = self.apply(&directive)? {
                message = Some(msg);
            }
        }
        Ok(message)
    }

    /// Apply one directive.
    ///
    /// # Errors
    ///
    /// See [`set`](Self::set).
    pub fn apply(&mut self, directive: &SetDirective) -> Result<Option<String>, String> {
        match directive {
            SetDirective::On(name) => self.set_number(name, true),
            SetDirective::Off(name) => self.set_number(name, false),
            SetDirective::Toggle(name) => self.set_number(name, !self.number),
            SetDirective::Query(name) => {
                check_name(name)?;
                Ok(Some(format_bool("number", self.number)))
            }
            SetDirective::Assign(name, value) => {
                check_name(name)?;
                Err(format!("Invalid argument: {name}={value}"))
            }
            SetDirective::ShowChanged => Ok((*self != Self::default())
                .then(|| format_bool("number", self.number))),
            SetDirective::ShowAll => Ok(Some(format_bool("number", self.number))),
        }
    }

    fn set_number(&mut self, name: &str, value: bool) -> Result<Option<String>, String> {
        check_name(name)?;
        self.number = value;
        let msg = if value {
            "Line numbers enabled"
        } else {
            "Line numbers disabled"
        };
        Ok(Some(msg.to_string()))
    }
}

fn check_name(name: &str) -> Result<(), String> {
    if is_bool_option(name) {
        Ok(())
    } else {
        Err(format!("Unknown option: {name}"))
    }
}
