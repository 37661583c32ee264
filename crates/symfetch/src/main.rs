mod reporter;

use std::env;
use std::io::{self, IsTerminal, Read};
use std::path::{Path, PathBuf};
use std::process;

use clap::{Parser, Subcommand};
use reporter::TerminalReporter;
use symfetch_core::config::FetchConfig;
use symfetch_core::host::{MappingListing, ScriptHost};
use symfetch_core::inspect::{create_inspector, InspectorKind};
use symfetch_core::report::{Message, Reporter};
use symfetch_core::script::{default_script_path, open_script, prepare_script_dir};
use symfetch_core::{Extension, Fetcher, Result as FetchResult};
use symfetch_utils::{debug, init_logging, init_logging_with_level, LogFormat, LogLevel};

/// Load matching libc debug symbols into a running GDB session by build-id.
#[derive(Parser, Debug)]
#[command(name = "symfetch")]
#[command(version)]
#[command(about = "Load matching libc debug symbols into a running GDB session by build-id", long_about = None)]
struct Cli
{
    #[command(subcommand)]
    command: Commands,

    /// Log level for diagnostics on stderr (overrides RUST_LOG)
    #[arg(long, global = true)]
    log_level: Option<LogLevel>,

    /// Disable colored message tags
    #[arg(long, global = true, default_value_t = false)]
    no_color: bool,
}

#[derive(Subcommand, Debug)]
enum Commands
{
    /// Locate the libc debug file and emit the add-symbol-file command
    Load
    {
        /// Debug root holding .build-id/ (default: $SYMFETCH_DEBUGDIR, then <libc dir>/.debug)
        path: Option<PathBuf>,
        /// Read mappings of this live process from /proc
        #[arg(long, conflicts_with = "mappings", required_unless_present = "mappings")]
        pid: Option<u32>,
        /// Read a mapping listing from FILE, or stdin for '-'
        #[arg(long, value_name = "FILE|-")]
        mappings: Option<PathBuf>,
        /// Write the command to this GDB script instead of stdout; emptied on failure.
        /// Must be a regular file owned by the current user
        #[arg(long, value_name = "FILE")]
        emit: Option<PathBuf>,
        /// Section and build-id source: 'readelf' or 'object'
        #[arg(long, default_value_t = InspectorKind::Readelf)]
        inspector: InspectorKind,
        /// readelf program to run (default: $SYMFETCH_READELF or 'readelf')
        #[arg(long, value_name = "PROGRAM")]
        readelf: Option<String>,
        /// Comma-separated sections to place; must include .text
        #[arg(long, value_name = "LIST")]
        sections: Option<String>,
        /// Regex selecting the library among the mappings
        #[arg(long, value_name = "REGEX")]
        library_pattern: Option<String>,
    },
    /// Print the GDB script that registers the fetch-debug command
    GdbScript
    {
        /// Also fetch automatically on every stop (default: $SYMFETCH_AUTO / $FETCH_DEFAULT)
        #[arg(long, default_value_t = false)]
        auto: bool,
        /// symfetch executable the script calls (default: this binary)
        #[arg(long, value_name = "PATH")]
        binary: Option<PathBuf>,
        /// Script each run writes its command to
        /// (default: $XDG_RUNTIME_DIR/symfetch/fetch.gdb, else under ~/.cache)
        #[arg(long, value_name = "FILE")]
        script_path: Option<PathBuf>,
    },
}

fn main()
{
    let cli = Cli::parse();

    // Logs go to stderr; stdout may be the command GDB reads back
    let logging = match cli.log_level {
        Some(level) => init_logging_with_level(level, LogFormat::Pretty),
        None => init_logging(),
    };
    let guard = match logging {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to initialize logging: {e}");
            process::exit(2);
        }
    };

    let color = !cli.no_color && io::stderr().is_terminal();
    let mut reporter = TerminalReporter::stderr(color);

    let result = FetchConfig::from_env().and_then(|config| run_command(cli.command, config, &mut reporter));
    let status = match result {
        Ok(true) => 0,
        Ok(false) => 1,
        Err(e) => {
            reporter.report(Message::Error(e.to_string()));
            2
        }
    };
    drop(guard);
    process::exit(status);
}

/// `Ok(false)` for a failed fetch, already reported; `Err` only for setup problems.
fn run_command<R: Reporter>(command: Commands, mut config: FetchConfig, reporter: &mut R) -> FetchResult<bool>
{
    match command {
        Commands::Load {
            path,
            pid,
            mappings,
            emit,
            inspector,
            readelf,
            sections,
            library_pattern,
        } => {
            if let Some(program) = readelf {
                config.readelf = program;
            }
            if let Some(list) = sections {
                config = config.with_sections(&list)?;
            }
            if let Some(pattern) = library_pattern {
                config = config.with_library_pattern(&pattern)?;
            }

            let listing = match (pid, mappings) {
                (Some(pid), _) => MappingListing::Proc(pid),
                (None, Some(source)) => MappingListing::Text(read_listing(&source)?),
                (None, None) => unreachable!("clap requires --pid or --mappings"),
            };
            debug!(?listing, %inspector, "starting load");

            let fetcher = Fetcher::new(config.clone(), create_inspector(inspector, &config));
            let outcome = match emit {
                Some(script) => {
                    // Emptied before the run so a failed run leaves nothing to source
                    let mut host = ScriptHost::new(listing, open_script(&script)?);
                    fetcher.execute(path.as_deref(), &mut host, reporter)
                }
                None => {
                    let mut host = ScriptHost::new(listing, io::stdout().lock());
                    fetcher.execute(path.as_deref(), &mut host, reporter)
                }
            };
            Ok(outcome.is_success())
        }
        Commands::GdbScript {
            auto,
            binary,
            script_path,
        } => {
            config.auto_fetch |= auto;
            let binary = match binary {
                Some(binary) => binary,
                None => env::current_exe()?,
            };
            let script_path = match script_path {
                Some(path) => path,
                None => {
                    let path = default_script_path(|key| env::var(key).ok())?;
                    prepare_script_dir(&path)?;
                    path
                }
            };

            print!("{}", gdb_script(config, &binary, &script_path, reporter));
            Ok(true)
        }
    }
}

/// Register the extension and render its GDB glue
fn gdb_script<R: Reporter>(config: FetchConfig, binary: &Path, script_path: &Path, reporter: &mut R) -> String
{
    let inspector = create_inspector(InspectorKind::default(), &config);
    let extension = Extension::register(Fetcher::new(config, inspector), reporter);
    extension.gdb_script(binary, script_path)
}

fn read_listing(source: &Path) -> io::Result<String>
{
    if source == Path::new("-") {
        let mut text = String::new();
        io::stdin().read_to_string(&mut text)?;
        Ok(text)
    } else {
        std::fs::read_to_string(source)
    }
}

#[cfg(test)]
mod tests
{
    use std::fs::{self, Permissions};
    use std::os::unix::fs::{symlink, PermissionsExt};
    use std::sync::OnceLock;

    use clap::CommandFactory;
    use symfetch_core::report::CollectingReporter;
    use symfetch_core::SymfetchError;
    use tempfile::TempDir;

    use super::*;

    const BUILD_ID: &str = "abcd1234";

    const SECTION_REPORT: &str = "\
There are 3 section headers, starting at offset 0x1000:

Section Headers:
  [Nr] Name              Type             Address           Offset
       Size              EntSize          Flags  Link  Info  Align
  [ 0]                   NULL             0000000000000000  00000000
       0000000000000000  0000000000000000           0     0     0
  [ 1] .text             PROGBITS         0000000000000100  00000100
       0000000000000010  0000000000000000  AX       0     0     16
  [ 2] .rodata           PROGBITS         0000000000000200  00000200
       0000000000000010  0000000000000000   A       0     0     16
";

    const NOTES_REPORT: &str = "\
Displaying notes found in: .note.gnu.build-id
  Owner                Data size \tDescription
  GNU                  0x00000004\tNT_GNU_BUILD_ID (unique build ID bitstring)
    Build ID: abcd1234
";

    /// Stand-in `readelf` printing fixed reports
    ///
    /// Written once, before any test spawns it, so no child ever inherits a
    /// descriptor open for writing on it.
    fn fake_readelf() -> String
    {
        static TOOL: OnceLock<TempDir> = OnceLock::new();
        let dir = TOOL.get_or_init(|| {
            let dir = TempDir::new().unwrap();
            let tool = dir.path().join("readelf");
            fs::write(
                &tool,
                format!(
                    "#!/bin/sh\ncase \"$1\" in\n-S) cat <<'EOF'\n{SECTION_REPORT}EOF\n;;\n-n) cat <<'EOF'\n{NOTES_REPORT}EOF\n;;\nesac\n"
                ),
            )
            .unwrap();
            fs::set_permissions(&tool, Permissions::from_mode(0o755)).unwrap();
            dir
        });
        dir.path().join("readelf").display().to_string()
    }

    /// A library, its mapping listing and a debug root
    struct Workspace
    {
        dir: TempDir,
    }

    impl Workspace
    {
        fn new() -> Self
        {
            let dir = TempDir::new().unwrap();
            let lib = dir.path().join("lib");
            fs::create_dir(&lib).unwrap();
            fs::write(lib.join("libc.so.6"), b"\x7fELF").unwrap();
            fs::write(
                dir.path().join("maps"),
                format!("0x1000 0x29000 0x28000 0x0 r--p {}\n", lib.join("libc.so.6").display()),
            )
            .unwrap();
            fs::create_dir(dir.path().join("debug")).unwrap();
            Self { dir }
        }

        fn install_debug_file(&self) -> PathBuf
        {
            let file = self.dir.path().join("debug/.build-id/ab/cd1234.debug");
            fs::create_dir_all(file.parent().unwrap()).unwrap();
            fs::write(&file, b"\x7fELF").unwrap();
            file
        }

        fn script(&self) -> PathBuf
        {
            self.dir.path().join("fetch.gdb")
        }

        fn load(&self, sections: Option<&str>) -> Commands
        {
            Commands::Load {
                path: Some(self.dir.path().join("debug")),
                pid: None,
                mappings: Some(self.dir.path().join("maps")),
                emit: Some(self.script()),
                inspector: InspectorKind::Readelf,
                readelf: Some(fake_readelf()),
                sections: sections.map(ToString::to_string),
                library_pattern: None,
            }
        }
    }

    #[test]
    fn test_cli_definition()
    {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_load_needs_a_mapping_source()
    {
        assert!(Cli::try_parse_from(["symfetch", "load"]).is_err());
        assert!(Cli::try_parse_from(["symfetch", "load", "--pid", "1", "--mappings", "-"]).is_err());
        assert!(Cli::try_parse_from(["symfetch", "load", "--mappings", "-", "--emit", "x.gdb"]).is_ok());
    }

    #[test]
    fn test_loaded_run_emits_command_and_confirmation()
    {
        let ws = Workspace::new();
        let debug_file = ws.install_debug_file();
        let mut reporter = CollectingReporter::new();

        let status = run_command(ws.load(None), FetchConfig::default(), &mut reporter).unwrap();

        assert!(status);
        assert_eq!(
            fs::read_to_string(ws.script()).unwrap(),
            format!(
                "add-symbol-file {} 0x1100 -s .rodata 0x1200\necho [+] Debug symbols loaded successfully!\\n\n",
                debug_file.display()
            )
        );
        assert!(!reporter.messages.contains(&Message::Loaded));
    }

    #[test]
    fn test_failed_run_empties_stale_script()
    {
        let ws = Workspace::new();
        fs::write(ws.script(), "shell echo stale\n").unwrap();
        let mut reporter = CollectingReporter::new();

        // No debug file installed
        let status = run_command(ws.load(None), FetchConfig::default(), &mut reporter).unwrap();

        assert!(!status);
        assert_eq!(fs::read_to_string(ws.script()).unwrap(), "");
        assert_eq!(reporter.messages.len(), 1);
        assert!(reporter.messages[0].to_string().contains("not exists"));
    }

    #[test]
    fn test_bad_section_list_is_a_setup_error()
    {
        let ws = Workspace::new();
        ws.install_debug_file();
        let mut reporter = CollectingReporter::new();

        let result = run_command(ws.load(Some(".data")), FetchConfig::default(), &mut reporter);

        assert!(matches!(result, Err(SymfetchError::InvalidArgument(_))));
        assert!(!ws.script().exists());
    }

    #[test]
    fn test_linked_script_is_refused()
    {
        let ws = Workspace::new();
        ws.install_debug_file();
        let planted = ws.dir.path().join("planted.gdb");
        fs::write(&planted, "shell echo planted\n").unwrap();
        symlink(&planted, ws.script()).unwrap();
        let mut reporter = CollectingReporter::new();

        let result = run_command(ws.load(None), FetchConfig::default(), &mut reporter);

        assert!(matches!(result, Err(SymfetchError::UnsafeScript { .. })));
        assert_eq!(fs::read_to_string(&planted).unwrap(), "shell echo planted\n");
    }

    #[test]
    fn test_gdb_script_without_auto_fetch()
    {
        let mut reporter = CollectingReporter::new();
        let text = gdb_script(
            FetchConfig::default(),
            Path::new("/usr/bin/symfetch"),
            Path::new("/run/user/1000/symfetch/fetch.gdb"),
            &mut reporter,
        );

        assert!(text.contains("--emit '/run/user/1000/symfetch/fetch.gdb'"));
        assert!(!text.contains("\ndefine hook-stop\n  fetch-debug\n"));
        assert!(reporter.messages.is_empty());
    }

    #[test]
    fn test_fetch_default_environment_adds_stop_hook()
    {
        let config = FetchConfig::from_lookup(|key| (key == "FETCH_DEFAULT").then(|| "1".to_string())).unwrap();
        let mut reporter = CollectingReporter::new();
        let text = gdb_script(
            config,
            Path::new("/usr/bin/symfetch"),
            Path::new("/run/user/1000/symfetch/fetch.gdb"),
            &mut reporter,
        );

        assert!(text.ends_with("define hook-stop\n  fetch-debug\nend\n"));
        assert_eq!(reporter.messages, [Message::AutoFetchEnabled]);
    }

    #[test]
    fn test_auto_flag_adds_stop_hook()
    {
        let dir = TempDir::new().unwrap();
        let command = Commands::GdbScript {
            auto: true,
            binary: Some(PathBuf::from("/usr/bin/symfetch")),
            script_path: Some(dir.path().join("fetch.gdb")),
        };
        let mut reporter = CollectingReporter::new();

        assert!(run_command(command, FetchConfig::default(), &mut reporter).unwrap());
        assert_eq!(reporter.messages, [Message::AutoFetchEnabled]);
    }
}
