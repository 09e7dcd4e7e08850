use argh::FromArgs;
use std::num::NonZeroUsize;
use std::sync::LazyLock;

fn loader_threads(count: &str) -> Result<Option<NonZeroUsize>, String> {
    Ok(count.parse().ok())
}

fn backend_list(list: &str) -> Result<Vec<String>, String> {
    Ok(list
        .split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_ascii_lowercase)
        .collect())
}

/// Runtime arguments
#[derive(Debug, Default, FromArgs)]
pub struct RuntimeArgs {
    #[argh(option, hidden_help, from_str_fn(loader_threads))]
    pub loader_threads: Option<Option<NonZeroUsize>>,
    #[argh(option, hidden_help, from_str_fn(backend_list))]
    pub force_backend: Option<Vec<String>>,
    #[argh(switch, hidden_help)]
    pub no_batching: bool,
}

impl RuntimeArgs {
    fn init() -> Option<RuntimeArgs> {
        let mut args = std::env::args();
        let cmd_name = args.next()?;
        let args: Vec<String> = args.collect();
        let args: Vec<&str> = args.iter().map(String::as_str).collect();
        RuntimeArgs::from_args(&[&cmd_name], &args).ok()
    }

    pub fn get() -> &'static RuntimeArgs {
        static INSTANCE: LazyLock<RuntimeArgs> =
            LazyLock::new(|| RuntimeArgs::init().unwrap_or_default());
        &INSTANCE
    }

    /// `max(1, hardware concurrency - 1)` unless overridden with `--loader-threads`.
    pub fn loader_thread_count(&self) -> usize {
        if let Some(count) = self.loader_threads.flatten() {
            return count.get();
        }

        std::thread::available_parallelism()
            .map_or(1, NonZeroUsize::get)
            .saturating_sub(1)
            .max(1)
    }
}
