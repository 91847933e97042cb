use clap::Parser;
use repotree::Request;

#[derive(Clone, Debug, Parser)]
#[command(name = "repotree", version = env!("CARGO_PKG_VERSION"), about, long_about = None)]
pub struct App {
    /// Repository to map, as `user/repo`
    pub slug: Option<String>,

    #[arg(short, long, default_value = "main", help = "Branch to download")]
    pub branch: String,

    #[arg(short, long, help = "Only map files under this directory")]
    pub dir: Option<String>,

    #[arg(short, long, value_delimiter = ',', help = "Keep only paths ending with one of these suffixes")]
    pub include: Vec<String>,

    #[arg(short, long, value_delimiter = ',', help = "Drop paths ending with one of these suffixes")]
    pub exclude: Vec<String>,

    #[arg(short, long, help = "Directory to write the report into")]
    pub output: Option<String>,

    #[arg(short, long, help = "Print the tree to stdout instead of writing a report")]
    pub stdout: bool,
}

impl App {
    /// `None` when no repository was given.
    pub fn request(self) -> Option<Request> {
        let slug = self.slug?;
        Some(Request {
            slug,
            branch: self.branch,
            dir: self.dir,
            output: self.output,
            stdout: self.stdout,
            include: self.include,
            exclude: self.exclude,
        })
    }
}
