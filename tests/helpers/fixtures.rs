//! Document builders for compile tests.

use specforge::{CompileResult, Compiler, SourceDocument};

/// A current-version tokens document around a `tokens` body.
pub fn tokens_doc(body: &str) -> String {
    format!(r#"{{"schemaVersion": "2.0.0", "kind": "tokens", "tokens": {body}}}"#)
}

/// A current-version components document around a `components` array.
pub fn components_doc(body: &str) -> String {
    format!(r#"{{"schemaVersion": "2.0.0", "kind": "components", "components": {body}}}"#)
}

/// A current-version patterns document around a `patterns` array.
pub fn patterns_doc(body: &str) -> String {
    format!(r#"{{"schemaVersion": "2.0.0", "kind": "patterns", "patterns": {body}}}"#)
}

/// Compile `(file name, JSON text)` pairs with the default compiler.
pub fn compile_json(files: &[(&str, String)]) -> CompileResult {
    let documents: Vec<SourceDocument> = files
        .iter()
        .map(|(name, text)| SourceDocument::json(*name, text.as_str()))
        .collect();
    Compiler::new().compile(&documents)
}

/// Primitive and semantic color tokens shared by several tests.
pub fn color_tokens() -> String {
    tokens_doc(
        r##"{
            "color": {
                "blue": { "600": { "value": "#2563eb" }, "700": { "value": "#1d4ed8" } },
                "interactive": {
                    "primary": { "value": "$color.blue.600" },
                    "primaryHover": { "value": "$color.blue.700" }
                }
            }
        }"##,
    )
}
