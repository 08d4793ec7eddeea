use context_interface::{CallError, CallOutcome, Frame, Host, Interpreter};
use database::{DBErrorMarker, Database};
use primitives::{Address, Bytes, HashMap, StorageKey, StorageValue, B256};
use state::AccountInfo;

pub(crate) type Script = fn(&Frame, &mut dyn Host) -> CallOutcome;

/// Interpreter that runs a native function per code blob.
#[derive(Clone, Debug, Default)]
pub(crate) struct ScriptedInterpreter {
    scripts: HashMap<Bytes, Script>,
}

impl ScriptedInterpreter {
    pub(crate) fn with(mut self, code: &Bytes, script: Script) -> Self {
        self.scripts.insert(code.clone(), script);
        self
    }
}

impl Interpreter for ScriptedInterpreter {
    fn run(&self, frame: &Frame, code: &Bytes, host: &mut dyn Host) -> CallOutcome {
        match self.scripts.get(code) {
            Some(script) => script(frame, host),
            None => CallOutcome::failure(
                CallError::Interpreter("unknown code".into()),
                Bytes::new(),
                0,
            ),
        }
    }
}

#[derive(Debug, thiserror::Error)]
#[error("backend unavailable")]
pub(crate) struct BackendDown;

impl DBErrorMarker for BackendDown {}

/// Database whose every read fails.
#[derive(Debug, Default)]
pub(crate) struct FailingDB;

impl Database for FailingDB {
    type Error = BackendDown;

    fn basic(&mut self, _address: Address) -> Result<Option<AccountInfo>, Self::Error> {
        Err(BackendDown)
    }

    fn code_by_hash(&mut self, _code_hash: B256) -> Result<Bytes, Self::Error> {
        Err(BackendDown)
    }

    fn storage(
        &mut self,
        _address: Address,
        _index: StorageKey,
    ) -> Result<StorageValue, Self::Error> {
        Err(BackendDown)
    }

    fn block_hash(&mut self, _number: u64) -> Result<B256, Self::Error> {
        Err(BackendDown)
    }
}
