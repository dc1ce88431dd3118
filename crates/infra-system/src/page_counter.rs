// PDF PageCounter (lopdf)

use async_trait::async_trait;
use qprint_core::port::{PageCountError, PageCounter};

/// Counts pages by parsing the document as PDF. Anything else is an error.
pub struct PdfPageCounter;

fn count_pdf_pages(data: &[u8]) -> Result<u32, PageCountError> {
    let document =
        lopdf::Document::load_mem(data).map_err(|e| PageCountError(format!("not a PDF: {}", e)))?;
    u32::try_from(document.get_pages().len())
        .map_err(|_| PageCountError("page count overflow".to_string()))
}

#[async_trait]
impl PageCounter for PdfPageCounter {
    async fn count_pages(&self, data: &[u8]) -> Result<u32, PageCountError> {
        // Parsing is CPU-bound; keep it off the async workers
        let data = data.to_vec();
        tokio::task::spawn_blocking(move || count_pdf_pages(&data))
            .await
            .map_err(|e| PageCountError(format!("page count task failed: {}", e)))?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::dictionary;
    use lopdf::{Document, Object, Stream};

    /// Minimal PDF with `pages` blank pages
    fn sample_pdf(pages: usize) -> Vec<u8> {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();

        let kids: Vec<Object> = (0..pages)
            .map(|_| {
                let content_id = doc.add_object(Stream::new(dictionary! {}, Vec::new()));
                doc.add_object(dictionary! {
                    "Type" => "Page",
                    "Parent" => pages_id,
                    "Contents" => content_id,
                })
                .into()
            })
            .collect();

        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => pages as i64,
                "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let mut out = Vec::new();
        doc.save_to(&mut out).unwrap();
        out
    }

    #[tokio::test]
    async fn test_counts_pdf_pages() {
        let pdf = sample_pdf(3);
        assert_eq!(PdfPageCounter.count_pages(&pdf).await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_rejects_non_pdf() {
        let err = PdfPageCounter
            .count_pages(b"just some text")
            .await
            .unwrap_err();
        assert!(err.to_string().contains("not a PDF"));
    }
}
