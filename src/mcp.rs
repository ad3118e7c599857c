use anyhow::Result;
use rmcp::{
    ServerHandler, ServiceExt,
    handler::server::{router::tool::ToolRouter, wrapper::Parameters},
    model::{ServerCapabilities, ServerInfo},
    schemars, tool, tool_router,
};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::directive::Markers;
use crate::library::NoProgress;
use crate::ops::{self, UnlockOutcome};
use crate::pdf::PdfDocument;

// Request structs for tools

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct PathRequest {
    #[schemars(description = "Path to the PDF file")]
    pub path: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct PdfExtractRequest {
    #[schemars(description = "Path to the source PDF file")]
    pub path: String,
    #[schemars(description = "Page ranges, 1-based (e.g., '1,3-5,7')")]
    pub pages: String,
    #[schemars(description = "Output file path")]
    pub output: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct PdfEditRequest {
    #[schemars(description = "Path to the source PDF file")]
    pub path: String,
    #[schemars(
        description = "Directive such as 'delete: 2,4 / reorder: 3,1,2'. Reorder numbers refer to the pages left after deletion."
    )]
    pub directive: String,
    #[schemars(description = "Use the Korean labels '삭제:' and '순서 변경:' (default: false)")]
    #[serde(default)]
    pub korean_labels: bool,
    #[schemars(description = "Output file path")]
    pub output: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct PdfMergeRequest {
    #[schemars(description = "PDF files to merge, in output order (at least two)")]
    pub inputs: Vec<String>,
    #[schemars(description = "Output file path")]
    pub output: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct PdfMergeFolderRequest {
    #[schemars(description = "Folder searched recursively for PDF files")]
    pub folder: String,
    #[schemars(description = "Output file path")]
    pub output: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct PdfCoverRequest {
    #[schemars(description = "PDF to place first")]
    pub cover: String,
    #[schemars(description = "PDF to place after the cover")]
    pub body: String,
    #[schemars(description = "Output file path")]
    pub output: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct PdfUnlockRequest {
    #[schemars(description = "Path to the encrypted PDF file")]
    pub path: String,
    #[schemars(description = "Password")]
    pub password: String,
    #[schemars(description = "Output file path")]
    pub output: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct PdfTextRequest {
    #[schemars(description = "Path to the PDF file")]
    pub path: String,
    #[schemars(description = "Output text file path")]
    pub output: String,
}

#[derive(Debug, Clone)]
pub struct PdfServer {
    #[allow(dead_code)]
    tool_router: ToolRouter<Self>,
}

impl PdfServer {
    pub fn new() -> Self {
        Self {
            tool_router: Self::tool_router(),
        }
    }
}

impl Default for PdfServer {
    fn default() -> Self {
        Self::new()
    }
}

fn to_json<T: Serialize>(result: &T) -> String {
    serde_json::to_string_pretty(result).unwrap_or_else(|e| format!("Error: {}", e))
}

#[tool_router]
impl PdfServer {
    #[tool(description = "Get the number of pages in a PDF")]
    fn pdf_page_count(&self, Parameters(PathRequest { path }): Parameters<PathRequest>) -> String {
        match PdfDocument::open(&path) {
            Ok(doc) => to_json(&PageCountResult {
                page_count: doc.page_count(),
                path,
            }),
            Err(e) => format!("Error: {}", e),
        }
    }

    #[tool(description = "Extract specific pages from a PDF and save them, in ascending order, to a new file")]
    fn pdf_extract(&self, Parameters(req): Parameters<PdfExtractRequest>) -> String {
        match ops::extract_pages(
            &crate::pdf::LopdfLibrary,
            Path::new(&req.path),
            &req.pages,
            Path::new(&req.output),
        ) {
            Ok(parsed) => to_json(&ExtractResult {
                output_path: req.output,
                page_count: parsed.pages.len() as u32,
                pages: parsed.pages.page_numbers(),
                skipped: parsed.dropped,
            }),
            Err(e) => format!("Error: {}", e),
        }
    }

    #[tool(description = "Delete and/or reorder pages of a PDF using a directive like 'delete: 2,4 / reorder: 3,1,2', and save the result")]
    fn pdf_edit_pages(&self, Parameters(req): Parameters<PdfEditRequest>) -> String {
        let markers = if req.korean_labels {
            Markers::KOREAN
        } else {
            Markers::ENGLISH
        };

        match ops::edit_pages(
            &crate::pdf::LopdfLibrary,
            Path::new(&req.path),
            &req.directive,
            &markers,
            Path::new(&req.output),
        ) {
            Ok(plan) => to_json(&EditResult {
                output_path: req.output,
                pages: plan.pages.page_numbers(),
                deleted: plan.deleted,
                skipped: plan.skipped,
            }),
            Err(e) => format!("Error: {}", e),
        }
    }

    #[tool(description = "Combine PDF files into one, in the order given")]
    fn pdf_merge(&self, Parameters(req): Parameters<PdfMergeRequest>) -> String {
        merge_result(
            ops::merge_files(
                &crate::pdf::LopdfLibrary,
                req.inputs.as_slice(),
                Path::new(&req.output),
                &mut NoProgress,
            ),
            req.output,
        )
    }

    #[tool(description = "Combine every PDF found under a folder (recursively), sorted by path")]
    fn pdf_merge_folder(&self, Parameters(req): Parameters<PdfMergeFolderRequest>) -> String {
        merge_result(
            ops::merge_folder(
                &crate::pdf::LopdfLibrary,
                Path::new(&req.folder),
                Path::new(&req.output),
                &mut NoProgress,
            ),
            req.output,
        )
    }

    #[tool(description = "Place a cover PDF in front of another PDF")]
    fn pdf_add_cover(&self, Parameters(req): Parameters<PdfCoverRequest>) -> String {
        merge_result(
            ops::add_cover(
                &crate::pdf::LopdfLibrary,
                Path::new(&req.cover),
                Path::new(&req.body),
                Path::new(&req.output),
                &mut NoProgress,
            ),
            req.output,
        )
    }

    #[tool(description = "Decrypt a password-protected PDF and save an unencrypted copy")]
    fn pdf_unlock(&self, Parameters(req): Parameters<PdfUnlockRequest>) -> String {
        match ops::unlock(
            &crate::pdf::LopdfLibrary,
            Path::new(&req.path),
            &req.password,
            Path::new(&req.output),
        ) {
            Ok(UnlockOutcome::Unlocked { pages }) => to_json(&UnlockResult {
                encrypted: true,
                output_path: Some(req.output),
                page_count: Some(pages),
            }),
            Ok(UnlockOutcome::NotEncrypted) => to_json(&UnlockResult {
                encrypted: false,
                output_path: None,
                page_count: None,
            }),
            Err(e) => format!("Error: {}", e),
        }
    }

    #[tool(description = "Extract the text of every page of a PDF into a text file")]
    fn pdf_extract_text(&self, Parameters(req): Parameters<PdfTextRequest>) -> String {
        match ops::extract_text(
            &crate::pdf::LopdfLibrary,
            Path::new(&req.path),
            Path::new(&req.output),
            &mut NoProgress,
        ) {
            Ok(pages) => to_json(&TextResult {
                output_path: req.output,
                page_count: pages,
            }),
            Err(e) => format!("Error: {}", e),
        }
    }
}

fn merge_result(result: crate::error::Result<ops::MergeOutcome>, output: String) -> String {
    match result {
        Ok(outcome) => to_json(&MergeResult {
            output_path: output,
            file_count: outcome.files,
            page_count: outcome.pages,
        }),
        Err(e) => format!("Error: {}", e),
    }
}

// Result types for MCP tools

#[derive(Debug, Serialize, Deserialize, schemars::JsonSchema)]
pub struct PageCountResult {
    pub path: String,
    pub page_count: u32,
}

#[derive(Debug, Serialize, Deserialize, schemars::JsonSchema)]
pub struct ExtractResult {
    pub output_path: String,
    pub page_count: u32,
    pub pages: Vec<u32>,
    pub skipped: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize, schemars::JsonSchema)]
pub struct EditResult {
    pub output_path: String,
    pub pages: Vec<u32>,
    pub deleted: usize,
    pub skipped: Vec<i64>,
}

#[derive(Debug, Serialize, Deserialize, schemars::JsonSchema)]
pub struct MergeResult {
    pub output_path: String,
    pub file_count: usize,
    pub page_count: u32,
}

#[derive(Debug, Serialize, Deserialize, schemars::JsonSchema)]
pub struct UnlockResult {
    pub encrypted: bool,
    pub output_path: Option<String>,
    pub page_count: Option<u32>,
}

#[derive(Debug, Serialize, Deserialize, schemars::JsonSchema)]
pub struct TextResult {
    pub output_path: String,
    pub page_count: u32,
}

impl ServerHandler for PdfServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(
                "PDF page manipulation tools. Use pdf_page_count to size a document, pdf_extract \
                 to copy page ranges, pdf_edit_pages to delete and reorder pages, pdf_merge, \
                 pdf_merge_folder and pdf_add_cover to combine documents, pdf_unlock to remove \
                 a password, and pdf_extract_text to dump page text."
                    .to_string(),
            ),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }
}

pub async fn run_server() -> Result<()> {
    let server = PdfServer::new();

    // Serve using stdin/stdout as a tuple
    let service = server.serve((tokio::io::stdin(), tokio::io::stdout())).await?;

    service.waiting().await?;

    Ok(())
}
