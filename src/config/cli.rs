use clap::Parser;

#[derive(Debug, Clone, Parser)]
#[command(name = "ciz-roster")]
#[command(about = "Import employees from a CSV file into the ciz backend")]
pub struct CliConfig {
    /// Path to TOML configuration file
    #[arg(short, long, default_value = "ciz.toml")]
    pub config: String,

    /// CSV (or TSV) file to import
    #[arg(short, long)]
    pub file: String,

    /// Validate only and write <file>.preview.json next to the input
    #[arg(long)]
    pub dry_run: bool,

    /// Override import.batch_size from the config file
    #[arg(long)]
    pub batch_size: Option<usize>,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,
}

impl CliConfig {
    /// 輸入檔所在目錄與檔名，交給 LocalStorage 使用
    pub fn split_file_path(&self) -> (String, String) {
        let path = std::path::Path::new(&self.file);
        let dir = path
            .parent()
            .map(|p| p.to_string_lossy().into_owned())
            .filter(|p| !p.is_empty())
            .unwrap_or_else(|| ".".to_string());
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.file.clone());
        (dir, name)
    }
}
