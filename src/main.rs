use clap::Parser;
use miette::Result;
use tarot_intake::cli::commands::{check, completions, config, run, submit};
use tarot_intake::cli::{Cli, Commands};

fn main() -> Result<()> {
    // Terminate silently on a closed pipe (`| head`) instead of panicking
    #[cfg(unix)]
    {
        unsafe {
            libc::signal(libc::SIGPIPE, libc::SIG_DFL);
        }
    }

    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(2)
                .tab_width(4)
                .build(),
        )
    }))?;

    let cli = Cli::parse();
    let global = cli.global;

    match cli.command {
        Commands::Run(args) => run::run(args, &global),
        Commands::Submit(args) => submit::run(args, &global),
        Commands::Check(cmd) => check::run(cmd, &global),
        Commands::Config(cmd) => config::run(cmd, &global),
        Commands::Completions(args) => completions::run(args),
    }
}
