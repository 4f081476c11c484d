pub mod equations;
pub mod ingest;
pub mod types;

use std::path::Path;

use anyhow::{Context, Result};
use tracing::debug;

use equations::extract_equation_candidates;
use types::{PaperId, ParsedDocument};

/// Content-addressed ID for a source path. Idempotent: same path = same ID.
pub fn document_id(path: &Path) -> PaperId {
    blake3::hash(path.to_string_lossy().as_bytes())
        .to_hex()
        .to_string()
}

fn is_pdf(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("pdf"))
}

/// Extract text and equation candidates from a PDF or plain-text file.
pub async fn parse_document(path: &Path) -> Result<ParsedDocument> {
    let source_path = tokio::fs::canonicalize(path)
        .await
        .with_context(|| format!("Failed to resolve {}", path.display()))?;
    let bytes = tokio::fs::read(&source_path)
        .await
        .with_context(|| format!("Failed to read {}", source_path.display()))?;

    let full_text = if is_pdf(&source_path) {
        // pdf-extract is CPU-bound, keep it off the async workers
        tokio::task::spawn_blocking(move || {
            pdf_extract::extract_text_from_mem(&bytes).map_err(|e| e.to_string())
        })
        .await
        .context("spawn_blocking join failed")?
        .map_err(|e| {
            anyhow::anyhow!("Failed to extract PDF text from {}: {}", source_path.display(), e)
        })?
    } else {
        String::from_utf8_lossy(&bytes).into_owned()
    };

    let file_name = source_path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| source_path.display().to_string());
    let equation_candidates = extract_equation_candidates(&full_text);

    debug!(
        file = %file_name,
        text_len = full_text.len(),
        equations = equation_candidates.len(),
        "document parsed"
    );

    Ok(ParsedDocument {
        source_path,
        file_name,
        full_text,
        equation_candidates,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[tokio::test]
    async fn test_parse_plain_text_document() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        std::fs::write(&path, "A Title\nloss = cross entropy\nbody text\n").unwrap();

        let doc = parse_document(&path).await.unwrap();
        assert_eq!(doc.file_name, "notes.txt");
        assert!(doc.source_path.is_absolute());
        assert!(doc.full_text.starts_with("A Title"));
        assert_eq!(doc.equation_candidates, vec!["loss = cross entropy".to_string()]);
    }

    #[tokio::test]
    async fn test_missing_file_is_an_error() {
        let err = parse_document(Path::new("/definitely/not/here.pdf")).await;
        assert!(err.is_err());
    }

    #[tokio::test]
    async fn test_invalid_pdf_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.PDF");
        std::fs::write(&path, b"not a pdf").unwrap();
        assert!(parse_document(&path).await.is_err());
    }

    #[test]
    fn test_document_id_is_stable() {
        let a = document_id(&PathBuf::from("/papers/a.pdf"));
        assert_eq!(a, document_id(&PathBuf::from("/papers/a.pdf")));
        assert_ne!(a, document_id(&PathBuf::from("/papers/b.pdf")));
        assert_eq!(a.len(), 64);
    }
}
