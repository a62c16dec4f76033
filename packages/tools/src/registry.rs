//! Built-in tool definitions.
//!
//! Order matters: tools run in catalogue order, so fixers and formatters come
//! before the checkers that would otherwise flag what they fix.

use crate::{Tool, ToolFamily};

pub const BUILTIN_TOOLS: &[Tool] = &[
    // Python
    Tool {
        name: "ruff:fix",
        binary: "ruff",
        args: &["check", "--fix", "."],
        family: ToolFamily::Formatter,
        languages: &["python"],
        requires: None,
        pass_files: false,
    },
    Tool {
        name: "ruff:format",
        binary: "ruff",
        args: &["format", "."],
        family: ToolFamily::Formatter,
        languages: &["python"],
        requires: None,
        pass_files: false,
    },
    Tool {
        name: "ruff:check",
        binary: "ruff",
        args: &["check", "."],
        family: ToolFamily::Checker,
        languages: &["python"],
        requires: None,
        pass_files: false,
    },
    Tool {
        name: "mypy",
        binary: "mypy",
        args: &["."],
        family: ToolFamily::Checker,
        languages: &["python"],
        requires: None,
        pass_files: false,
    },
    Tool {
        name: "pip-audit",
        binary: "pip-audit",
        args: &["-r", "requirements.txt"],
        family: ToolFamily::Auditor,
        languages: &["python"],
        requires: Some("requirements.txt"),
        pass_files: false,
    },
    // TypeScript / JavaScript
    Tool {
        name: "prettier",
        binary: "prettier",
        args: &["--write", "."],
        family: ToolFamily::Formatter,
        languages: &["typescript", "javascript"],
        requires: None,
        pass_files: false,
    },
    Tool {
        name: "eslint",
        binary: "eslint",
        args: &["."],
        family: ToolFamily::Checker,
        languages: &["typescript", "javascript"],
        requires: None,
        pass_files: false,
    },
    Tool {
        name: "tsc",
        binary: "tsc",
        args: &["--noEmit"],
        family: ToolFamily::Checker,
        languages: &["typescript"],
        requires: Some("tsconfig.json"),
        pass_files: false,
    },
    Tool {
        name: "npm:audit",
        binary: "npm",
        args: &["audit"],
        family: ToolFamily::Auditor,
        languages: &["typescript", "javascript"],
        requires: Some("package-lock.json"),
        pass_files: false,
    },
    // YAML
    Tool {
        name: "yamllint",
        binary: "yamllint",
        args: &["."],
        family: ToolFamily::Checker,
        languages: &["yaml"],
        requires: None,
        pass_files: false,
    },
    // Shell
    Tool {
        name: "shellcheck",
        binary: "shellcheck",
        args: &[],
        family: ToolFamily::Checker,
        languages: &["shell"],
        requires: None,
        pass_files: true,
    },
    // TOML
    Tool {
        name: "taplo:fmt",
        binary: "taplo",
        args: &["fmt"],
        family: ToolFamily::Formatter,
        languages: &["toml"],
        requires: None,
        pass_files: false,
    },
];

#[must_use]
pub fn find_tool(name: &str) -> Option<&'static Tool> {
    BUILTIN_TOOLS.iter().find(|x| x.name == name)
}
