//! Shell, PowerShell and batch scripts that install or invoke the SDK.
//!
//! Scripts are rewritten one line at a time. Only two kinds of command lines
//! are touched: `dotnet-install` invocations (`--channel`, `--version`) and
//! `dotnet` invocations that pass a framework moniker (`-f`, `--framework`).
//! The same rules apply to `run:` blocks in CI workflows.

use std::ops::Range;
use std::path::Path;
use std::sync::LazyLock;

use bumper_core::versioning::sdk_pin::SdkPin;
use bumper_core::versioning::TargetFramework;
use bumper_core::{ProcessingResult, UpgradeInfo, UpgradeResult};
use regex::Regex;

use super::{process_files, FileOutcome, UpgradeRequest, Upgrader};
use crate::discovery::FilePatterns;
use crate::documents::lines::split_lines;
use crate::documents::{DocumentError, TextEdits};

pub const SCRIPT_PATTERNS: &[&str] = &["*.ps1", "*.psm1", "*.sh", "*.bash", "*.cmd", "*.bat"];

static DOTNET_INSTALL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)dotnet-install").expect("install regex is valid"));

static CHANNEL_ARG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)(?:^|\s)(?:--channel|-Channel)\s+["']?(?P<value>[^\s"';|&]+)"#).expect("channel regex is valid")
});

static VERSION_ARG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)(?:^|\s)(?:--version|-Version)\s+["']?(?P<value>[^\s"';|&]+)"#).expect("version regex is valid")
});

static RUNTIME_ARG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(?:^|\s)(?:--runtime|-Runtime)\s").expect("runtime regex is valid"));

static DOTNET_COMMAND: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:^|[\s;&|(])dotnet(?:\.exe)?\s").expect("dotnet command regex is valid")
});

static FRAMEWORK_ARG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?:^|\s)(?:-f|--framework|-Framework)(?:\s+|[:=])["']?(?P<value>net[^\s"';|&]+)"#)
        .expect("framework regex is valid")
});

/// One substitution on a command line. `range` is relative to the line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct CommandEdit {
    pub range: Range<usize>,
    pub replacement: String,
    pub change: String,
}

/// Substitutions for a single (non-comment) command line.
pub(crate) fn command_edits(line: &str, upgrade: &UpgradeInfo) -> Vec<CommandEdit> {
    let mut edits = Vec::new();

    if DOTNET_INSTALL.is_match(line) {
        let mut pins = vec![CHANNEL_ARG.captures(line)];
        if !RUNTIME_ARG.is_match(line) {
            pins.push(VERSION_ARG.captures(line));
        }
        for caps in pins.into_iter().flatten() {
            let Some(value) = caps.name("value") else {
                continue;
            };
            let Some(next) = SdkPin::parse(value.as_str()).and_then(|pin| pin.upgrade_single(upgrade)) else {
                continue;
            };
            edits.push(CommandEdit {
                range: value.range(),
                replacement: next.to_string(),
                change: format!("Update .NET SDK from {} to {next}", value.as_str()),
            });
        }
    }

    if DOTNET_COMMAND.is_match(line) {
        for caps in FRAMEWORK_ARG.captures_iter(line) {
            let Some(value) = caps.name("value") else {
                continue;
            };
            let Some(tfm) = TargetFramework::parse(value.as_str()) else {
                continue;
            };
            if tfm.is_older_than(upgrade.channel) {
                let updated = tfm.retarget(upgrade.channel).to_string();
                edits.push(CommandEdit {
                    range: value.range(),
                    change: format!("Update target framework from {} to {updated}", value.as_str()),
                    replacement: updated,
                });
            }
        }
    }

    edits
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScriptKind {
    PowerShell,
    Shell,
    Batch,
}

impl ScriptKind {
    fn of(path: &Path) -> Self {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);
        match extension.as_deref() {
            Some("ps1" | "psm1") => Self::PowerShell,
            Some("cmd" | "bat") => Self::Batch,
            _ => Self::Shell,
        }
    }

    fn comment_markers(self) -> &'static [&'static str] {
        match self {
            Self::PowerShell | Self::Shell => &["#"],
            Self::Batch => &["::", "REM ", "rem ", "Rem ", "@REM ", "@rem "],
        }
    }

    fn check_structure(self, source: &str) -> Result<(), DocumentError> {
        match self {
            Self::PowerShell => check_powershell_brackets(source),
            Self::Shell => check_shell_structure(source),
            Self::Batch => check_batch_blocks(source),
        }
    }
}

/// Check that every bracket in a PowerShell script is closed in order.
///
/// Strings, here-strings, line comments and `<# #>` block comments are skipped.
pub fn check_powershell_brackets(source: &str) -> Result<(), DocumentError> {
    let chars: Vec<char> = source.chars().collect();
    let mut stack: Vec<(char, usize)> = Vec::new();
    let mut line = 1;
    let mut i = 0;

    let unterminated = |what: &str, line: usize| DocumentError::Script {
        line,
        message: format!("unterminated {what}"),
    };

    while i < chars.len() {
        let c = chars[i];
        let next = chars.get(i + 1).copied();
        match c {
            '\n' => line += 1,
            '`' => {
                if next == Some('\n') {
                    line += 1;
                }
                i += 2;
                continue;
            }
            '<' if next == Some('#') => {
                let start = line;
                i += 2;
                loop {
                    match chars.get(i) {
                        None => return Err(unterminated("block comment", start)),
                        Some('#') if chars.get(i + 1) == Some(&'>') => break,
                        Some('\n') => line += 1,
                        _ => {}
                    }
                    i += 1;
                }
                i += 2;
                continue;
            }
            '#' => {
                let starts_token = i == 0 || chars[i - 1].is_whitespace() || ";(){}".contains(chars[i - 1]);
                if starts_token {
                    while i < chars.len() && chars[i] != '\n' {
                        i += 1;
                    }
                    continue;
                }
            }
            '@' if matches!(next, Some('"' | '\'')) && chars.get(i + 2).is_some_and(|c| *c == '\n' || *c == '\r') => {
                let quote = next.unwrap_or('"');
                let start = line;
                i += 2;
                loop {
                    match chars.get(i) {
                        None => return Err(unterminated("here-string", start)),
                        Some('\n') => {
                            line += 1;
                            if chars.get(i + 1) == Some(&quote) && chars.get(i + 2) == Some(&'@') {
                                i += 3;
                                break;
                            }
                        }
                        _ => {}
                    }
                    i += 1;
                }
                continue;
            }
            '\'' | '"' => {
                let start = line;
                i += 1;
                loop {
                    match chars.get(i) {
                        None => return Err(unterminated("string", start)),
                        Some('`') if c == '"' => i += 1,
                        Some(q) if *q == c => {
                            // A doubled quote is an escaped quote.
                            if chars.get(i + 1) == Some(&c) {
                                i += 1;
                            } else {
                                break;
                            }
                        }
                        Some('\n') => line += 1,
                        _ => {}
                    }
                    i += 1;
                }
            }
            '(' | '{' | '[' => stack.push((c, line)),
            ')' | '}' | ']' => {
                let open = match c {
                    ')' => '(',
                    '}' => '{',
                    _ => '[',
                };
                match stack.pop() {
                    Some((o, _)) if o == open => {}
                    Some((o, opened)) => {
                        return Err(DocumentError::Script {
                            line,
                            message: format!("'{c}' does not close '{o}' opened on line {opened}"),
                        })
                    }
                    None => {
                        return Err(DocumentError::Script {
                            line,
                            message: format!("unexpected '{c}'"),
                        })
                    }
                }
            }
            _ => {}
        }
        i += 1;
    }

    match stack.pop() {
        Some((o, opened)) => Err(DocumentError::Script {
            line: opened,
            message: format!("'{o}' is never closed"),
        }),
        None => Ok(()),
    }
}

/// Open shell compound commands: opener, closer, line opened.
struct ShellScanner {
    open: Vec<(&'static str, &'static str, usize)>,
    word: String,
    quoted: bool,
    command_position: bool,
}

impl ShellScanner {
    fn end_word(&mut self, line: usize) -> Result<(), DocumentError> {
        let word = std::mem::take(&mut self.word);
        let quoted = std::mem::replace(&mut self.quoted, false);
        if word.is_empty() && !quoted {
            return Ok(());
        }
        // Reserved words only count where a command name could stand.
        if quoted || !self.command_position {
            self.command_position = false;
            return Ok(());
        }

        self.command_position = matches!(
            word.as_str(),
            "if" | "then" | "else" | "elif" | "while" | "until" | "do" | "!" | "time"
        );
        match word.as_str() {
            "if" => self.open.push(("if", "fi", line)),
            "case" => self.open.push(("case", "esac", line)),
            "do" => self.open.push(("do", "done", line)),
            "fi" | "esac" | "done" => match self.open.pop() {
                Some((_, closer, _)) if closer == word => {}
                Some((opener, _, opened)) => {
                    return Err(DocumentError::Script {
                        line,
                        message: format!("'{word}' does not close '{opener}' opened on line {opened}"),
                    })
                }
                None => {
                    return Err(DocumentError::Script {
                        line,
                        message: format!("unexpected '{word}'"),
                    })
                }
            },
            _ => {}
        }
        Ok(())
    }
}

/// Check that a POSIX shell script's `if`/`fi`, `case`/`esac` and `do`/`done`
/// pair up, and that quotes and here-documents are terminated.
pub fn check_shell_structure(source: &str) -> Result<(), DocumentError> {
    let chars: Vec<char> = source.chars().collect();
    let mut scanner = ShellScanner {
        open: Vec::new(),
        word: String::new(),
        quoted: false,
        command_position: true,
    };
    let mut heredocs: Vec<(String, usize)> = Vec::new();
    let mut line = 1;
    let mut i = 0;

    let unterminated = |what: &str, line: usize| DocumentError::Script {
        line,
        message: format!("unterminated {what}"),
    };

    while i < chars.len() {
        let c = chars[i];
        match c {
            '\\' => {
                scanner.quoted = true;
                if chars.get(i + 1) == Some(&'\n') {
                    line += 1;
                }
                i += 2;
                continue;
            }
            '\'' | '"' | '`' => {
                let start = line;
                scanner.quoted = true;
                i += 1;
                loop {
                    match chars.get(i) {
                        None => return Err(unterminated("string", start)),
                        Some('\\') if c != '\'' => {
                            if chars.get(i + 1) == Some(&'\n') {
                                line += 1;
                            }
                            i += 1;
                        }
                        Some(q) if *q == c => break,
                        Some('\n') => line += 1,
                        _ => {}
                    }
                    i += 1;
                }
            }
            '#' if scanner.word.is_empty() && !scanner.quoted => {
                while i < chars.len() && chars[i] != '\n' {
                    i += 1;
                }
                continue;
            }
            '\n' => {
                scanner.end_word(line)?;
                scanner.command_position = true;
                line += 1;
                i += 1;
                for (delimiter, opened) in std::mem::take(&mut heredocs) {
                    loop {
                        if i >= chars.len() {
                            return Err(unterminated("here-document", opened));
                        }
                        let end = chars[i..].iter().position(|c| *c == '\n').map_or(chars.len(), |p| i + p);
                        let body: String = chars[i..end].iter().collect();
                        i = end + 1;
                        line += 1;
                        if body.trim() == delimiter {
                            break;
                        }
                    }
                }
                continue;
            }
            ';' | '&' | '|' | '(' | ')' => {
                scanner.end_word(line)?;
                scanner.command_position = true;
            }
            '<' if chars.get(i + 1) == Some(&'<') => {
                scanner.end_word(line)?;
                scanner.command_position = false;
                if chars.get(i + 2) == Some(&'<') {
                    i += 3;
                    continue;
                }
                i += 2;
                if chars.get(i) == Some(&'-') {
                    i += 1;
                }
                while chars.get(i).is_some_and(|c| *c == ' ' || *c == '\t') {
                    i += 1;
                }
                let mut delimiter = String::new();
                while let Some(&d) = chars.get(i) {
                    if d.is_whitespace() || ";&|<>()".contains(d) {
                        break;
                    }
                    if !matches!(d, '\'' | '"' | '\\') {
                        delimiter.push(d);
                    }
                    i += 1;
                }
                if delimiter.is_empty() {
                    return Err(DocumentError::Script {
                        line,
                        message: "here-document without a delimiter".into(),
                    });
                }
                heredocs.push((delimiter, line));
                continue;
            }
            '<' | '>' => {
                scanner.end_word(line)?;
                scanner.command_position = false;
            }
            c if c.is_whitespace() => scanner.end_word(line)?,
            c => scanner.word.push(c),
        }
        i += 1;
    }
    scanner.end_word(line)?;

    if let Some((_, opened)) = heredocs.first() {
        return Err(unterminated("here-document", *opened));
    }
    match scanner.open.pop() {
        Some((opener, _, opened)) => Err(DocumentError::Script {
            line: opened,
            message: format!("'{opener}' is never closed"),
        }),
        None => Ok(()),
    }
}

/// Check that every parenthesised block in a batch file is closed.
///
/// Batch quotes never span lines, and `^` escapes the next character.
pub fn check_batch_blocks(source: &str) -> Result<(), DocumentError> {
    let mut open: Vec<usize> = Vec::new();
    for line in split_lines(source) {
        if line.is_comment(ScriptKind::Batch.comment_markers()) {
            continue;
        }
        let mut in_quotes = false;
        let mut escaped = false;
        for c in line.text.chars() {
            if escaped {
                escaped = false;
                continue;
            }
            match c {
                '^' if !in_quotes => escaped = true,
                '"' => in_quotes = !in_quotes,
                '(' if !in_quotes => open.push(line.number),
                ')' if !in_quotes => {
                    open.pop();
                }
                _ => {}
            }
        }
    }
    match open.pop() {
        Some(opened) => Err(DocumentError::Script {
            line: opened,
            message: "'(' is never closed".into(),
        }),
        None => Ok(()),
    }
}

pub struct ScriptUpgrader;

impl Upgrader for ScriptUpgrader {
    fn name(&self) -> &'static str {
        "scripts"
    }

    fn upgrade(&self, request: &UpgradeRequest<'_>) -> UpgradeResult<ProcessingResult> {
        let files = request.find(&FilePatterns::new(SCRIPT_PATTERNS))?;
        let upgrade = request.upgrade;

        process_files(self.name(), request, &files, |file, relative| {
            let kind = ScriptKind::of(relative);
            if let Err(e) = kind.check_structure(&file.content) {
                return Ok(FileOutcome::malformed(&e));
            }

            let mut edits = TextEdits::new();
            let mut changes = Vec::new();
            for line in split_lines(&file.content) {
                if line.is_comment(kind.comment_markers()) {
                    continue;
                }
                for edit in command_edits(line.text, upgrade) {
                    let range = line.start + edit.range.start..line.start + edit.range.end;
                    edits.replace(range, edit.replacement);
                    changes.push(edit.change);
                }
            }

            if edits.is_empty() {
                return Ok(FileOutcome::unchanged());
            }
            Ok(FileOutcome::unchanged().with_content(&file.content, edits.apply(&file.content), changes))
        })
    }
}
