//! cminus_diagnostics: Diagnostic messages and error reporting infrastructure.
//!
//! Defines the message templates emitted by the binder and the type checker.
//! Diagnostics carry a source line number; analysis never aborts on an error,
//! it accumulates diagnostics and lets the caller consult the failure flag.

use std::fmt;

/// Diagnostic category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagnosticCategory {
    Warning,
    Error,
    Message,
}

impl fmt::Display for DiagnosticCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiagnosticCategory::Warning => write!(f, "warning"),
            DiagnosticCategory::Error => write!(f, "error"),
            DiagnosticCategory::Message => write!(f, "message"),
        }
    }
}

/// A diagnostic message template with a code and category. The message may
/// contain `{0}`, `{1}`, etc. placeholders.
#[derive(Debug, Clone)]
pub struct DiagnosticMessage {
    pub code: u32,
    pub category: DiagnosticCategory,
    pub message: &'static str,
}

/// A realized diagnostic with its source line and resolved message text.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    /// The source line this diagnostic refers to.
    pub line: u32,
    /// The resolved message text.
    pub message_text: String,
    /// The diagnostic code.
    pub code: u32,
    /// The category.
    pub category: DiagnosticCategory,
}

impl Diagnostic {
    pub fn new(line: u32, message: &DiagnosticMessage, args: &[&str]) -> Self {
        Self {
            line,
            message_text: format_message(message.message, args),
            code: message.code,
            category: message.category,
        }
    }

    pub fn is_error(&self) -> bool {
        self.category == DiagnosticCategory::Error
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} CM{}: {} at line {}",
            self.category, self.code, self.message_text, self.line
        )
    }
}

/// Replace `{0}`, `{1}`, etc. in a message template with arguments.
pub fn format_message(template: &str, args: &[&str]) -> String {
    let mut result = template.to_string();
    for (i, arg) in args.iter().enumerate() {
        result = result.replace(&format!("{{{}}}", i), arg);
    }
    result
}

/// Diagnostics accumulated during one analysis run.
#[derive(Debug, Clone, Default)]
pub struct DiagnosticCollection {
    diagnostics: Vec<Diagnostic>,
}

impl DiagnosticCollection {
    pub fn new() -> Self {
        Self { diagnostics: Vec::new() }
    }

    pub fn add(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    /// The run-level "analysis failed" flag.
    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(Diagnostic::is_error)
    }

    pub fn error_count(&self) -> usize {
        self.diagnostics.iter().filter(|d| d.is_error()).count()
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn into_diagnostics(self) -> Vec<Diagnostic> {
        self.diagnostics
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    pub fn len(&self) -> usize {
        self.diagnostics.len()
    }

    pub fn extend(&mut self, other: DiagnosticCollection) {
        self.diagnostics.extend(other.diagnostics);
    }

    pub fn clear(&mut self) {
        self.diagnostics.clear();
    }

    /// Stable sort by source line.
    pub fn sort(&mut self) {
        self.diagnostics.sort_by_key(|d| d.line);
    }
}

// ============================================================================
// Diagnostic Messages
// ============================================================================

pub mod messages {
    use super::*;

    macro_rules! diag {
        ($code:expr, Error, $msg:expr) => {
            DiagnosticMessage {
                code: $code,
                category: DiagnosticCategory::Error,
                message: $msg,
            }
        };
        ($code:expr, Warning, $msg:expr) => {
            DiagnosticMessage {
                code: $code,
                category: DiagnosticCategory::Warning,
                message: $msg,
            }
        };
    }

    // ========================================================================
    // Binding errors (1000-1099)
    // ========================================================================
    pub const REDEFINITION_OF_FUNCTION_0: DiagnosticMessage =
        diag!(1001, Error, "Redefinition of Function {0}");
    pub const FUNCTION_DEFINITION_IS_NOT_ALLOWED_HERE: DiagnosticMessage =
        diag!(1002, Error, "Function Definition is not allowed here");
    pub const _0_VARIABLE_TYPE_CANNOT_BE_VOID: DiagnosticMessage =
        diag!(1003, Error, "{0} Variable Type cannot be Void");
    pub const _0_ARRAY_TYPE_CANNOT_BE_VOID: DiagnosticMessage =
        diag!(1004, Error, "{0} Array Type cannot be Void");
    pub const REDEFINITION_OF_0: DiagnosticMessage =
        diag!(1005, Error, "Redefinition of {0}");
    pub const PARAMETER_TYPE_CANNOT_BE_VOID: DiagnosticMessage =
        diag!(1006, Error, "Parameter Type cannot be Void");
    pub const REDEFINITION_OF_PARAMETER_0: DiagnosticMessage =
        diag!(1007, Error, "Redefinition of Parameter {0}");
    pub const UNDECLARED_VARIABLE_0: DiagnosticMessage =
        diag!(1008, Error, "Undeclared Variable {0}");
    pub const UNDECLARED_FUNCTION_0: DiagnosticMessage =
        diag!(1009, Error, "Undeclared Function {0}");

    // ========================================================================
    // Type errors (2000-2099)
    // ========================================================================
    pub const EXPECTED_EXPRESSION: DiagnosticMessage =
        diag!(2001, Error, "expected expression");
    pub const STATEMENT_REQUIRES_SCALAR_EXPRESSION: DiagnosticMessage = diag!(
        2002,
        Error,
        "statement requires expression of scalar type ('void' invalid)"
    );
    pub const INVALID_RETURN_TYPE: DiagnosticMessage =
        diag!(2003, Error, "invalid return type");
    pub const EXPRESSION_IS_NOT_ASSIGNABLE: DiagnosticMessage =
        diag!(2004, Error, "expression is not assignable");
    pub const TYPE_INCONSISTENCY: DiagnosticMessage =
        diag!(2005, Error, "type inconsistency");
    pub const ARRAY_SUBSCRIPT_IS_NOT_AN_INTEGER_0: DiagnosticMessage =
        diag!(2006, Error, "array subscript is not an integer {0}");
    pub const IMPLICIT_DECLARATION_OF_FUNCTION_0: DiagnosticMessage =
        diag!(2007, Error, "implicit declaration of function {0}");
    pub const INVALID_FUNCTION_CALL: DiagnosticMessage =
        diag!(2008, Error, "invalid function call");
    pub const INVALID_EXPRESSION: DiagnosticMessage =
        diag!(2009, Error, "invalid expression");
}
