use std::path::Path;

use swc_common::sync::Lrc;
use swc_common::{FileName, SourceMap, Spanned};
use swc_ecma_ast::{BinExpr, BinaryOp, CallExpr, Callee, Expr, Lit};
use swc_ecma_parser::{lexer::Lexer, EsSyntax, Parser, StringInput, Syntax};
use swc_ecma_visit::{Visit, VisitWith};

/// Name of the only recognised translation function
pub const GETTEXT: &str = "gettext";

/// How the first argument of a `gettext` call is read
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgumentKind {
    Literal,
    Concatenation,
    Unsupported,
}

impl ArgumentKind {
    fn of(expr: &Expr) -> Self {
        match expr {
            Expr::Lit(_) => ArgumentKind::Literal,
            Expr::Bin(BinExpr {
                op: BinaryOp::Add, ..
            }) => ArgumentKind::Concatenation,
            Expr::Paren(paren) => ArgumentKind::of(&paren.expr),
            _ => ArgumentKind::Unsupported,
        }
    }
}

/// Visitor collecting the message of every `gettext(...)` call
#[derive(Debug, Default)]
pub struct GettextVisitor {
    pub messages: Vec<String>,
    /// Calls whose argument shape could not be folded into a string
    pub skipped: usize,
}

impl GettextVisitor {
    pub fn new() -> Self {
        Self::default()
    }

    fn is_gettext_call(callee: &Callee) -> bool {
        match callee {
            Callee::Expr(expr) => {
                matches!(expr.as_ref(), Expr::Ident(ident) if &*ident.sym == GETTEXT)
            }
            _ => false,
        }
    }

    fn message_from_call(&mut self, call: &CallExpr) -> Option<String> {
        let arg = call.args.first()?;
        if arg.spread.is_some() {
            self.skipped += 1;
            return None;
        }

        let message = match ArgumentKind::of(&arg.expr) {
            ArgumentKind::Literal | ArgumentKind::Concatenation => fold_concatenation(&arg.expr),
            ArgumentKind::Unsupported => {
                tracing::debug!(
                    "skipping {}() call with unsupported argument at {:?}",
                    GETTEXT,
                    arg.expr.span()
                );
                self.skipped += 1;
                return None;
            }
        };

        (!message.is_empty()).then_some(message)
    }
}

impl Visit for GettextVisitor {
    fn visit_call_expr(&mut self, call: &CallExpr) {
        if Self::is_gettext_call(&call.callee) {
            if let Some(message) = self.message_from_call(call) {
                self.messages.push(message);
            }
        }

        // Nested calls such as gettext(gettext('a')) are still visited
        call.visit_children_with(self);
    }
}

/// Fold a literal or a `+` chain of literals into one string.
///
/// Operands of any other shape contribute nothing.
pub fn fold_concatenation(expr: &Expr) -> String {
    match expr {
        Expr::Lit(lit) => literal_text(lit).unwrap_or_default(),
        Expr::Bin(bin) if bin.op == BinaryOp::Add => {
            let mut folded = fold_concatenation(&bin.left);
            folded.push_str(&fold_concatenation(&bin.right));
            folded
        }
        Expr::Paren(paren) => fold_concatenation(&paren.expr),
        _ => String::new(),
    }
}

fn literal_text(lit: &Lit) -> Option<String> {
    match lit {
        Lit::Str(s) => s.value.as_str().map(|s| s.to_string()),
        Lit::Num(n) => Some(n.value.to_string()),
        Lit::Bool(b) => Some(b.value.to_string()),
        Lit::BigInt(b) => Some(b.value.to_string()),
        Lit::Null(_) => Some("null".to_string()),
        Lit::Regex(re) => Some(format!("/{}/{}", re.exp, re.flags)),
        _ => None,
    }
}

/// Extract every `gettext` message from JavaScript source.
///
/// Recoverable syntax errors are logged and extraction continues over the
/// parsed tree; an unrecoverable error yields no messages.
pub fn extract_messages<P: AsRef<Path>>(source: &str, path: P) -> Vec<String> {
    let path = path.as_ref();
    let cm: Lrc<SourceMap> = Default::default();

    let fm = cm.new_source_file(
        FileName::Real(path.to_path_buf()).into(),
        source.to_string(),
    );

    let syntax = Syntax::Es(EsSyntax::default());
    let lexer = Lexer::new(syntax, Default::default(), StringInput::from(&*fm), None);
    let mut parser = Parser::new_from(lexer);

    let program = match parser.parse_program() {
        Ok(program) => program,
        Err(e) => {
            let loc = cm.lookup_char_pos(e.span().lo);
            tracing::warn!(
                "Parse error in {}:{}:{}: {:?}",
                path.display(),
                loc.line,
                loc.col_display + 1,
                e.kind()
            );
            return Vec::new();
        }
    };

    for e in parser.take_errors() {
        let loc = cm.lookup_char_pos(e.span().lo);
        tracing::debug!(
            "Recovered from syntax error in {}:{}:{}: {:?}",
            path.display(),
            loc.line,
            loc.col_display + 1,
            e.kind()
        );
    }

    let mut visitor = GettextVisitor::new();
    program.visit_with(&mut visitor);
    visitor.messages
}
