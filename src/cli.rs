use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::directive::Markers;

#[derive(Parser)]
#[command(name = "pdfpages")]
#[command(about = "Extract, delete, reorder and merge PDF pages, with MCP server support")]
#[command(version)]
pub struct Cli {
    /// More log output (-v info, -vv debug); RUST_LOG overrides
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

/// Language of the section labels in edit directives
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum Labels {
    /// "delete: 2,4 / reorder: 3,1,2"
    #[default]
    English,
    /// "삭제: 2,4 / 순서 변경: 3,1,2"
    Korean,
}

impl Labels {
    pub fn markers(self) -> Markers {
        match self {
            Labels::English => Markers::ENGLISH,
            Labels::Korean => Markers::KOREAN,
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run as MCP server
    Mcp,

    /// Extract page ranges to a new PDF
    #[command(alias = "cat")]
    Extract {
        /// PDF file to extract from
        path: PathBuf,

        /// Page ranges (e.g., "1,3-5,7")
        pages: String,

        /// Output file
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Delete and/or reorder pages
    Edit {
        /// PDF file to edit
        path: PathBuf,

        /// Directive (e.g., "delete: 2,4 / reorder: 3,1,2")
        directive: String,

        /// Output file
        #[arg(short, long)]
        output: PathBuf,

        /// Language of the section labels
        #[arg(long, value_enum, default_value_t)]
        labels: Labels,
    },

    /// Show the page order an edit directive would produce, without writing
    Plan {
        /// PDF file to inspect
        path: PathBuf,

        /// Directive (e.g., "delete: 2,4 / reorder: 3,1,2")
        directive: String,

        /// Language of the section labels
        #[arg(long, value_enum, default_value_t)]
        labels: Labels,
    },

    /// Combine multiple PDFs into one, in the order given
    Merge {
        /// PDF files to merge
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        /// Output file
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Combine every PDF under a folder, sorted by path
    MergeFolder {
        /// Folder to search recursively
        folder: PathBuf,

        /// Output file
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Put a cover document in front of another
    Cover {
        /// Cover PDF
        cover: PathBuf,

        /// Body PDF
        body: PathBuf,

        /// Output file
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Save a decrypted copy of a password-protected PDF
    Unlock {
        /// Encrypted PDF file
        path: PathBuf,

        /// Password
        #[arg(short, long)]
        password: String,

        /// Output file
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Extract the text of all pages to a text file
    Text {
        /// PDF file to read
        path: PathBuf,

        /// Output text file
        #[arg(short, long)]
        output: PathBuf,
    },
}
