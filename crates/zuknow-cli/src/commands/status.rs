//! Status command handler

use anyhow::Result;

use zuknow_core::query;
use zuknow_core::{Config, QuestionRepository};

use crate::output::{Output, OutputFormat};

/// Show status information
pub fn show(repo: &QuestionRepository, config: &Config, output: &Output) -> Result<()> {
    let storage = repo.storage_stats();
    let stats = query::statistics(repo.questions());

    match output.format {
        OutputFormat::Json => {
            output.print_json(&serde_json::json!({
                "data_dir": config.data_dir,
                "storage": {
                    "backend": config.storage.as_str(),
                    "location": storage.location,
                    "exists": storage.exists,
                    "size": storage.size,
                    "size_human": storage.size_human()
                },
                "counts": {
                    "questions": stats.total,
                    "categories": stats.category_count(),
                    "tags": stats.tag_count()
                }
            }));
        }
        OutputFormat::Quiet => {
            println!("{}", storage.location);
        }
        OutputFormat::Human => {
            println!("zuknow Status");
            println!("=============");
            println!();
            println!("Storage:");
            println!("  Backend:  {}", config.storage);
            println!("  Location: {}", storage.location);
            if storage.exists {
                println!("  Size:     {}", storage.size_human());
            } else {
                println!("  Size:     (nothing saved yet)");
            }
            println!();
            println!("Contents:");
            println!("  Questions:  {}", stats.total);
            println!("  Categories: {}", stats.category_count());
            println!("  Tags:       {}", stats.tag_count());
        }
    }

    Ok(())
}
