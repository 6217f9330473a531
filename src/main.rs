use anyhow::Result;

mod app;
mod logging;

fn main() -> Result<()> {
    let args = vfs_redirect::cli::parse();
    app::run(args)
}
