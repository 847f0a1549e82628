use printpdf::{BuiltinFont, Mm, PdfDocument};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::SweeperConfig;
use crate::error::{Result, SweeperError};
use crate::export::ExportArtifact;
use crate::types::TabularData;
use crate::utils::format_kb;

// A4 portrait with a 10mm margin; each entry sits in a 200mm x 10mm cell.
const PAGE_WIDTH_MM: f32 = 210.0;
const PAGE_HEIGHT_MM: f32 = 297.0;
const MARGIN_MM: f32 = 10.0;
const CELL_WIDTH_MM: f32 = 200.0;
const LINE_HEIGHT_MM: f32 = 10.0;
const PT_TO_MM: f32 = 0.352_778;
// Helvetica averages roughly half an em per glyph
const AVG_GLYPH_EM: f32 = 0.5;

/// The facts printed in a report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportSummary {
    pub file_name: String,
    pub size_bytes: u64,
    pub row_count: usize,
    pub column_count: usize,
}

impl ReportSummary {
    pub fn new(file_name: &str, size_bytes: u64, data: &TabularData) -> Self {
        Self {
            file_name: file_name.to_string(),
            size_bytes,
            row_count: data.height(),
            column_count: data.width(),
        }
    }

    pub fn title(&self) -> String {
        format!("Data Report - {}", self.file_name)
    }

    /// The report lines in print order, title first.
    pub fn lines(&self) -> Vec<String> {
        vec![
            self.title(),
            format!("File Size: {}", format_kb(self.size_bytes)),
            format!("Total Rows: {}", self.row_count),
            format!("Total Columns: {}", self.column_count),
        ]
    }
}

/// Renders single-page PDF reports.
#[derive(Debug, Clone)]
pub struct ReportGenerator {
    font_size: f32,
}

impl Default for ReportGenerator {
    fn default() -> Self {
        Self::new(&SweeperConfig::default())
    }
}

impl ReportGenerator {
    pub fn new(config: &SweeperConfig) -> Self {
        Self {
            font_size: config.report_font_size,
        }
    }

    /// `<file name>_report.pdf`
    pub fn report_file_name(file_name: &str) -> String {
        format!("{}_report.pdf", file_name)
    }

    /// Render the summary as PDF bytes: centered title, then one line per fact.
    pub fn render_pdf(&self, summary: &ReportSummary) -> Result<Vec<u8>> {
        let title = summary.title();
        let (doc, page, layer) = PdfDocument::new(
            title.as_str(),
            Mm(PAGE_WIDTH_MM),
            Mm(PAGE_HEIGHT_MM),
            "Layer 1",
        );
        let font = doc
            .add_builtin_font(BuiltinFont::Helvetica)
            .map_err(pdf_error)?;
        let layer = doc.get_page(page).get_layer(layer);

        for (i, line) in summary.lines().into_iter().enumerate() {
            let x = if i == 0 {
                self.centered_x(&line)
            } else {
                MARGIN_MM
            };
            let y = self.baseline_y(i);
            layer.use_text(line, self.font_size, Mm(x), Mm(y), &font);
        }

        let bytes = doc.save_to_bytes().map_err(pdf_error)?;
        debug!("Rendered report for '{}' ({} bytes)", summary.file_name, bytes.len());
        Ok(bytes)
    }

    /// Render the report and wrap it as a downloadable artifact.
    pub fn artifact(&self, summary: &ReportSummary) -> Result<ExportArtifact> {
        let bytes = self.render_pdf(summary)?;
        info!("Generated report for '{}'", summary.file_name);
        Ok(ExportArtifact {
            file_name: Self::report_file_name(&summary.file_name),
            mime_type: "application/pdf".to_string(),
            bytes,
        })
    }

    fn centered_x(&self, text: &str) -> f32 {
        let width = text.chars().count() as f32 * self.font_size * AVG_GLYPH_EM * PT_TO_MM;
        MARGIN_MM + ((CELL_WIDTH_MM - width) / 2.0).max(0.0)
    }

    /// Baseline of line `index`, measured from the bottom of the page.
    fn baseline_y(&self, index: usize) -> f32 {
        let cell_top = MARGIN_MM + LINE_HEIGHT_MM * index as f32;
        let baseline_from_top = cell_top + LINE_HEIGHT_MM / 2.0 + 0.3 * self.font_size * PT_TO_MM;
        PAGE_HEIGHT_MM - baseline_from_top
    }
}

fn pdf_error(err: impl std::fmt::Debug) -> SweeperError {
    SweeperError::PdfRender(format!("{:?}", err))
}
