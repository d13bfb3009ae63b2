fn main() {
    use clap::Parser;
    use std::error::Error;
    let args = storyscrape::cli::Args::parse();

    let settings = match storyscrape::cli::Settings::resolve(&args) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(e.exit_code());
        }
    };
    let level = storyscrape::logging::level_for(args.quiet, args.verbose);
    if let Err(e) = storyscrape::logging::init(level, Some(settings.log_file.as_path())) {
        eprintln!("Warning: logging to {} disabled: {:#}", settings.log_file.display(), e);
        let _ = storyscrape::logging::init(level, None);
    }

    if let Err(e) = storyscrape::cli::run(&args, &settings) {
        tracing::error!(error = %e, "Fatal error");
        let mut source = e.source();
        while let Some(s) = source {
            tracing::error!(cause = %s, "Caused by");
            source = s.source();
        }

        eprintln!("\nSomething went wrong: {}", e);
        if e.is_network() {
            eprintln!("  - Check that the URL is a story page and opens in a browser.");
            eprintln!("  - Check your network connection.");
            eprintln!("  - The site may be rate-limiting; try again later or raise --delay.");
        }
        eprintln!("See '{}' for details.", settings.log_file.display());
        if args.verbose {
            let mut source = e.source();
            while let Some(s) = source {
                eprintln!("  cause: {}", s);
                source = s.source();
            }
        }
        std::process::exit(e.exit_code());
    }
}
