//! Capability traits implemented by the engine.
//!
//! State writes fail with [`StateError::WriteProtection`] while a static
//! frame is running, whichever capability they come through.
use crate::{
    frame::{CallInputs, CallScheme, CreateScheme},
    Evm,
};
use context_interface::{
    Block, BlockContextAccessor, CallContext, CallOutcome, CallPrimitives, CfgEnv,
    CreateOutcome, Frame, Host, Interpreter, JournalCheckpoint, SelfDestructResult, StateAccess,
    StateAccessor, StateDb, StateError,
};
use database::Database;
use precompile::PrecompileManager;
use primitives::{Address, Bytes, Log, StorageKey, StorageValue, B256, U256};

impl<DB: Database, I, PM> Evm<DB, I, PM> {
    #[inline]
    fn ensure_writable(&self) -> Result<(), StateError> {
        if self.is_static {
            return Err(StateError::WriteProtection);
        }
        Ok(())
    }

    fn transfer_result(
        &mut self,
        result: Result<Option<context_interface::TransferError>, DB::Error>,
    ) -> Result<(), StateError> {
        match self.db_result(result)? {
            Some(err) => Err(err.into()),
            None => Ok(()),
        }
    }
}

impl<DB: Database, I, PM> StateAccess for Evm<DB, I, PM> {
    fn balance(&mut self, address: Address) -> Result<U256, StateError> {
        let balance = self
            .journal
            .load_account(address)
            .map(|account| account.data.info.balance);
        self.db_result(balance)
    }

    fn nonce(&mut self, address: Address) -> Result<u64, StateError> {
        let nonce = self
            .journal
            .load_account(address)
            .map(|account| account.data.info.nonce);
        self.db_result(nonce)
    }

    fn code(&mut self, address: Address) -> Result<Bytes, StateError> {
        let code = self
            .journal
            .load_code(address)
            .map(|account| account.data.info.code.clone().unwrap_or_default());
        self.db_result(code)
    }

    fn code_hash(&mut self, address: Address) -> Result<B256, StateError> {
        let hash = self.journal.load_account(address).map(|account| {
            if account.is_loaded_as_not_existing() || account.is_empty() {
                B256::ZERO
            } else {
                account.info.code_hash
            }
        });
        self.db_result(hash)
    }

    fn exists(&mut self, address: Address) -> Result<bool, StateError> {
        let exists = self.journal.load_account(address).map(|account| {
            !account.is_loaded_as_not_existing() || account.is_created() || !account.info.is_empty()
        });
        self.db_result(exists)
    }

    fn is_empty(&mut self, address: Address) -> Result<bool, StateError> {
        let empty = self.journal.is_empty(address);
        self.db_result(empty)
    }

    fn sload(&mut self, address: Address, key: StorageKey) -> Result<StorageValue, StateError> {
        let value = self.journal.sload(address, key).map(|slot| slot.data);
        self.db_result(value)
    }

    fn sstore(
        &mut self,
        address: Address,
        key: StorageKey,
        value: StorageValue,
    ) -> Result<(), StateError> {
        self.ensure_writable()?;
        let stored = self.journal.sstore(address, key, value).map(|_| ());
        self.db_result(stored)
    }

    fn transfer(&mut self, from: Address, to: Address, value: U256) -> Result<(), StateError> {
        self.ensure_writable()?;
        let result = self.journal.transfer(from, to, value);
        self.transfer_result(result)
    }

    fn add_balance(&mut self, address: Address, value: U256) -> Result<(), StateError> {
        self.ensure_writable()?;
        let result = self.journal.balance_incr(address, value);
        self.transfer_result(result)
    }

    fn sub_balance(&mut self, address: Address, value: U256) -> Result<(), StateError> {
        self.ensure_writable()?;
        let result = self.journal.balance_decr(address, value);
        self.transfer_result(result)
    }

    fn inc_nonce(&mut self, address: Address) -> Result<u64, StateError> {
        self.ensure_writable()?;
        let nonce = self.journal.inc_nonce(address);
        self.db_result(nonce)?.ok_or(StateError::NonceOverflow)
    }

    fn set_code(&mut self, address: Address, code: Bytes) -> Result<(), StateError> {
        self.ensure_writable()?;
        let stored = self.journal.set_code(address, code);
        self.db_result(stored)
    }
}

impl<DB: Database, I, PM> StateDb for Evm<DB, I, PM> {
    #[inline]
    fn checkpoint(&mut self) -> JournalCheckpoint {
        self.journal.checkpoint()
    }

    #[inline]
    fn checkpoint_commit(&mut self) {
        self.journal.checkpoint_commit()
    }

    #[inline]
    fn checkpoint_revert(&mut self, checkpoint: JournalCheckpoint) {
        self.journal.checkpoint_revert(checkpoint)
    }

    fn log(&mut self, log: Log) -> Result<(), StateError> {
        self.ensure_writable()?;
        self.journal.log(log);
        Ok(())
    }

    fn warm_account(&mut self, address: Address) -> Result<bool, StateError> {
        let is_cold = self.journal.load_account(address).map(|load| load.is_cold);
        self.db_result(is_cold)
    }

    fn warm_storage(&mut self, address: Address, key: StorageKey) -> Result<bool, StateError> {
        let is_cold = self.journal.sload(address, key).map(|load| load.is_cold);
        self.db_result(is_cold)
    }

    fn is_warm_account(&self, address: Address) -> bool {
        self.journal
            .state
            .get(&address)
            .is_some_and(|account| !account.is_cold())
            || self.journal.warm_preloaded_addresses.contains(&address)
    }

    #[inline]
    fn add_refund(&mut self, delta: i64) {
        self.journal.add_refund(delta)
    }

    #[inline]
    fn refund(&self) -> i64 {
        self.journal.refund
    }

    #[inline]
    fn tload(&mut self, address: Address, key: StorageKey) -> StorageValue {
        self.journal.tload(address, key)
    }

    fn tstore(
        &mut self,
        address: Address,
        key: StorageKey,
        value: StorageValue,
    ) -> Result<(), StateError> {
        self.ensure_writable()?;
        self.journal.tstore(address, key, value);
        Ok(())
    }

    fn selfdestruct(
        &mut self,
        address: Address,
        target: Address,
    ) -> Result<SelfDestructResult, StateError> {
        self.ensure_writable()?;
        let result = self
            .journal
            .selfdestruct(address, target)
            .map(|load| load.data);
        self.db_result(result)
    }
}

impl<DB: Database, I, PM> StateAccessor for Evm<DB, I, PM> {
    #[inline]
    fn state(&mut self) -> &mut dyn StateAccess {
        self
    }
}

impl<DB: Database, I, PM> BlockContextAccessor for Evm<DB, I, PM> {
    #[inline]
    fn block(&self) -> &dyn Block {
        &self.block
    }

    #[inline]
    fn chain_id(&self) -> u64 {
        self.cfg.chain_id
    }
}

impl<DB, I, PM> CallContext for Evm<DB, I, PM>
where
    DB: Database,
    I: Interpreter + Clone,
    PM: PrecompileManager + Clone,
{
    fn call(
        &mut self,
        me: &Frame,
        address: Address,
        input: Bytes,
        gas: u64,
        value: U256,
    ) -> CallOutcome {
        self.execute_call(CallInputs {
            scheme: CallScheme::Call,
            caller: me.address,
            target_address: address,
            bytecode_address: address,
            value,
            input,
            gas_limit: gas,
            is_static: me.is_static,
        })
    }

    fn call_code(
        &mut self,
        me: &Frame,
        address: Address,
        input: Bytes,
        gas: u64,
        value: U256,
    ) -> CallOutcome {
        self.execute_call(CallInputs {
            scheme: CallScheme::CallCode,
            caller: me.address,
            target_address: me.address,
            bytecode_address: address,
            value,
            input,
            gas_limit: gas,
            is_static: me.is_static,
        })
    }

    fn delegate_call(
        &mut self,
        me: &Frame,
        address: Address,
        input: Bytes,
        gas: u64,
    ) -> CallOutcome {
        self.execute_call(CallInputs {
            scheme: CallScheme::DelegateCall,
            caller: me.caller,
            target_address: me.address,
            bytecode_address: address,
            value: me.value,
            input,
            gas_limit: gas,
            is_static: me.is_static,
        })
    }

    fn static_call(
        &mut self,
        me: &Frame,
        address: Address,
        input: Bytes,
        gas: u64,
    ) -> CallOutcome {
        CallPrimitives::static_call(self, me.address, address, input, gas)
    }

    fn create(&mut self, me: &Frame, init_code: Bytes, gas: u64, value: U256) -> CreateOutcome {
        self.execute_create(me.address, init_code, gas, value, CreateScheme::Create)
    }

    fn create2(
        &mut self,
        me: &Frame,
        init_code: Bytes,
        gas: u64,
        value: U256,
        salt: B256,
    ) -> CreateOutcome {
        self.execute_create(
            me.address,
            init_code,
            gas,
            value,
            CreateScheme::Create2 { salt },
        )
    }
}

impl<DB, I, PM> CallPrimitives for Evm<DB, I, PM>
where
    DB: Database,
    I: Interpreter + Clone,
    PM: PrecompileManager + Clone,
{
    fn call(
        &mut self,
        caller: Address,
        address: Address,
        input: Bytes,
        gas: u64,
        value: U256,
    ) -> CallOutcome {
        self.execute_call(CallInputs {
            scheme: CallScheme::Call,
            caller,
            target_address: address,
            bytecode_address: address,
            value,
            input,
            gas_limit: gas,
            is_static: false,
        })
    }

    fn static_call(
        &mut self,
        caller: Address,
        address: Address,
        input: Bytes,
        gas: u64,
    ) -> CallOutcome {
        self.execute_call(CallInputs {
            scheme: CallScheme::StaticCall,
            caller,
            target_address: address,
            bytecode_address: address,
            value: U256::ZERO,
            input,
            gas_limit: gas,
            is_static: true,
        })
    }

    fn create(
        &mut self,
        caller: Address,
        init_code: Bytes,
        gas: u64,
        value: U256,
    ) -> CreateOutcome {
        self.execute_create(caller, init_code, gas, value, CreateScheme::Create)
    }

    fn create2(
        &mut self,
        caller: Address,
        init_code: Bytes,
        gas: u64,
        value: U256,
        salt: B256,
    ) -> CreateOutcome {
        self.execute_create(caller, init_code, gas, value, CreateScheme::Create2 { salt })
    }
}

impl<DB, I, PM> Host for Evm<DB, I, PM>
where
    DB: Database,
    I: Interpreter + Clone,
    PM: PrecompileManager + Clone,
{
    #[inline]
    fn cfg(&self) -> &CfgEnv {
        &self.cfg
    }

    fn block_hash(&mut self, number: u64) -> Result<B256, StateError> {
        let hash = self.journal.block_hash(number);
        self.db_result(hash)
    }
}
