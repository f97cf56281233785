use clap::Parser;
use epm::cli::commands::edit::EditRequest;
use epm::cli::commands::generate::GenerateArgs;
use epm::cli::{Cli, Commands};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Init => epm::cli::commands::init::execute(&cli),
        Commands::Add {
            ref website,
            ref username,
            generate,
            ref note,
            ref otp_secret,
            ref backup_codes,
        } => epm::cli::commands::add::execute(
            &cli,
            website,
            username,
            generate,
            note,
            otp_secret.as_deref(),
            backup_codes,
        ),
        Commands::Edit {
            id,
            ref website,
            ref username,
            ref note,
            password,
            generate,
            ref otp_secret,
            clear_otp,
            ref backup_codes,
            clear_backup_codes,
        } => {
            let request = EditRequest {
                website: website.as_deref(),
                username: username.as_deref(),
                note: note.as_deref(),
                prompt_password: password,
                generate,
                otp_secret: otp_secret.as_deref(),
                clear_otp,
                backup_codes,
                clear_backup_codes,
            };
            epm::cli::commands::edit::execute(&cli, id, &request)
        }
        Commands::List { show_passwords } => {
            epm::cli::commands::list::execute(&cli, show_passwords)
        }
        Commands::Show { id, field } => epm::cli::commands::show::execute(&cli, id, field),
        Commands::Delete { id, force } => epm::cli::commands::delete::execute(&cli, id, force),
        Commands::Generate {
            length,
            spaces,
            no_lower,
            no_upper,
            no_digits,
            no_punctuation,
        } => epm::cli::commands::generate::execute(&GenerateArgs {
            length,
            spaces,
            no_lower,
            no_upper,
            no_digits,
            no_punctuation,
        }),
        Commands::Totp { id } => epm::cli::commands::totp::execute(&cli, id),
        Commands::BackupCodes { id, ref use_code } => {
            epm::cli::commands::backup_codes::execute(&cli, id, use_code.as_deref())
        }
        Commands::ChangePassword => epm::cli::commands::change_password::execute(&cli),
        Commands::History { last } => epm::cli::commands::history::execute(&cli, last),
        Commands::Completions { ref shell } => epm::cli::commands::completions::execute(shell),
    };

    if let Err(e) = result {
        epm::cli::output::error(&e.to_string());
        std::process::exit(1);
    }
}

/// Log to stderr; `RUST_LOG` wins over `--verbose`.
fn init_logging(verbose: bool) {
    let fallback = if verbose { "epm=debug" } else { "warn" };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));
    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_level(true)
                .with_target(false),
        )
        .init();
}
