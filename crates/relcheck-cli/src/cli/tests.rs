use super::*;

fn parse(args: &[&str]) -> Cli {
    Cli::try_parse_from(args).unwrap()
}

#[test]
fn cli_parse_sfv() {
    match parse(&["relcheck", "sfv", "/rel/Some.Release-GRP"]).command {
        CliCommand::Sfv { path } => assert_eq!(path, PathBuf::from("/rel/Some.Release-GRP")),
        _ => panic!("expected Sfv"),
    }
}

#[test]
fn cli_parse_zip_with_nfo() {
    match parse(&["relcheck", "zip", "rel", "--save-nfo", "out.nfo"]).command {
        CliCommand::Zip { path, save_nfo } => {
            assert_eq!(path, PathBuf::from("rel"));
            assert_eq!(save_nfo, Some(PathBuf::from("out.nfo")));
        }
        _ => panic!("expected Zip"),
    }
}

#[test]
fn cli_parse_srr_defaults() {
    match parse(&["relcheck", "srr", "rel"]).command {
        CliCommand::Srr {
            fast, extensions, ..
        } => {
            assert!(!fast);
            assert!(extensions.iter().any(|e| e == "mkv"));
        }
        _ => panic!("expected Srr"),
    }
}

#[test]
fn cli_parse_srr_fast_and_ext() {
    match parse(&["relcheck", "srr", "rel", "--fast", "--ext", "mkv,mp4"]).command {
        CliCommand::Srr {
            fast, extensions, ..
        } => {
            assert!(fast);
            assert_eq!(extensions, ["mkv", "mp4"]);
        }
        _ => panic!("expected Srr with --fast"),
    }
}

#[test]
fn cli_parse_crc_want() {
    match parse(&["relcheck", "crc", "file.rar", "--want", "D61538EA"]).command {
        CliCommand::Crc { want, .. } => assert_eq!(want, Some(0xd61538ea)),
        _ => panic!("expected Crc"),
    }
    assert!(Cli::try_parse_from(["relcheck", "crc", "f", "--want", "xyz"]).is_err());
    assert!(Cli::try_parse_from(["relcheck", "crc", "f", "--want", "123456789"]).is_err());
}

#[test]
fn cli_parse_global_overrides_after_subcommand() {
    let cli = parse(&[
        "relcheck",
        "sfv",
        "rel",
        "--read-mode",
        "sequential",
        "--threads",
        "4",
        "--timeout",
        "60",
    ]);
    assert_eq!(cli.global.read_mode, Some(ReadModeArg::Sequential));
    assert_eq!(cli.global.threads, Some(4));

    let mut cfg = VerifyConfig::default();
    cli.global.apply(&mut cfg);
    assert_eq!(cfg.engine.read_mode, ReadMode::Sequential);
    assert_eq!(cfg.engine.hash_threads, 4);
    assert_eq!(cfg.timeout_secs, Some(60));
}

#[test]
fn no_overrides_keep_config() {
    let mut cfg = VerifyConfig::default();
    cfg.engine.hash_threads = 7;
    GlobalArgs::default().apply(&mut cfg);
    assert_eq!(cfg.engine.hash_threads, 7);
    assert_eq!(cfg.engine.read_mode, ReadMode::Auto);
}

#[test]
fn explicit_config_file_is_loaded() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("relcheck.toml");
    std::fs::write(&path, "[engine]\nread_mode = \"parallel\"\n").unwrap();
    let args = GlobalArgs {
        config: Some(path),
        threads: Some(2),
        ..GlobalArgs::default()
    };
    let cfg = args.load_config().unwrap();
    assert_eq!(cfg.engine.read_mode, ReadMode::Parallel);
    assert_eq!(cfg.engine.hash_threads, 2);
}

#[test]
fn cli_parse_generators() {
    assert!(matches!(
        parse(&["relcheck", "completions", "bash"]).command,
        CliCommand::Completions { .. }
    ));
    assert!(matches!(
        parse(&["relcheck", "manpage"]).command,
        CliCommand::Manpage
    ));
    assert!(matches!(
        parse(&["relcheck", "config"]).command,
        CliCommand::Config
    ));
}

#[test]
fn cancelled_errors_exit_130() {
    assert_eq!(exit_code(&anyhow::Error::new(Cancelled::Canceled)), 130);
    assert_eq!(exit_code(&anyhow::Error::new(Cancelled::DeadlineExceeded)), 130);
    assert_eq!(exit_code(&anyhow::anyhow!("sfv check failed")), 1);
}

#[test]
fn cli_definition_is_consistent() {
    use clap::CommandFactory;
    Cli::command().debug_assert();
}
