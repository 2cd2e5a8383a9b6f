use common_cells::{Builder, Cell, CellError, CellPack, CellUnpack, FormatError, Slice};
use common_constants::{LOCK_ID_BITS, LOCK_LOCKED, LOCK_STATE_BITS, LOCK_UNLOCKED};

const LOCK_ID_MODULUS: u16 = 1 << LOCK_ID_BITS;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LockState {
    Unlocked,
    Locked,
}

impl LockState {
    pub fn as_u8(self) -> u8 {
        match self {
            LockState::Unlocked => LOCK_UNLOCKED,
            LockState::Locked => LOCK_LOCKED,
        }
    }
}

impl TryFrom<u8> for LockState {
    type Error = FormatError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            LOCK_UNLOCKED => Ok(LockState::Unlocked),
            LOCK_LOCKED => Ok(LockState::Locked),
            other => Err(FormatError::InvalidLockState(other)),
        }
    }
}

/// Optimistic lock for one operation kind. The id fences stale unlocks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TxLock {
    pub id: u16,
    pub state: LockState,
}

impl TxLock {
    pub fn initial() -> Self {
        TxLock {
            id: 0,
            state: LockState::Unlocked,
        }
    }

    pub fn is_locked(&self) -> bool {
        self.state == LockState::Locked
    }

    /// The lock as it looks after the next lock acquisition: id bumped
    /// modulo 1024.
    pub fn next_locked(&self) -> Self {
        TxLock {
            id: (self.id + 1) % LOCK_ID_MODULUS,
            state: LockState::Locked,
        }
    }

    pub fn unlocked(&self) -> Self {
        TxLock {
            id: self.id,
            state: LockState::Unlocked,
        }
    }

    pub fn from_parts(id: u64, state: u64) -> Result<Self, FormatError> {
        if id >= LOCK_ID_MODULUS as u64 {
            return Err(CellError::ValueDoesNotFit { bits: LOCK_ID_BITS }.into());
        }
        let state = u8::try_from(state).map_err(|_| FormatError::InvalidLockState(u8::MAX))?;
        Ok(TxLock {
            id: id as u16,
            state: LockState::try_from(state)?,
        })
    }

    fn store(&self, builder: &mut Builder) -> Result<(), CellError> {
        builder
            .store_u64(self.id.into(), LOCK_ID_BITS)?
            .store_u64(self.state.as_u8().into(), LOCK_STATE_BITS)?;
        Ok(())
    }

    fn load(slice: &mut Slice) -> Result<Self, FormatError> {
        let id = slice.load_u64(LOCK_ID_BITS)?;
        let state = slice.load_u64(LOCK_STATE_BITS)?;
        Self::from_parts(id, state)
    }
}

impl Default for TxLock {
    fn default() -> Self {
        TxLock::initial()
    }
}

/// One lock per guarded operation, stored in this order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TxLocks {
    pub withdrawal: TxLock,
    pub borrowing: TxLock,
    pub repayment: TxLock,
    pub liquidation: TxLock,
}

impl TxLocks {
    pub fn initial() -> Self {
        Self::default()
    }

    /// `(id, state)` pairs in storage order, as returned by the user
    /// contract's `fetch_tx_locks` getter.
    pub fn from_pairs(pairs: [(u64, u64); 4]) -> Result<Self, FormatError> {
        let [withdrawal, borrowing, repayment, liquidation] = pairs;
        Ok(TxLocks {
            withdrawal: TxLock::from_parts(withdrawal.0, withdrawal.1)?,
            borrowing: TxLock::from_parts(borrowing.0, borrowing.1)?,
            repayment: TxLock::from_parts(repayment.0, repayment.1)?,
            liquidation: TxLock::from_parts(liquidation.0, liquidation.1)?,
        })
    }

    pub fn any_locked(&self) -> bool {
        [
            self.withdrawal,
            self.borrowing,
            self.repayment,
            self.liquidation,
        ]
        .iter()
        .any(TxLock::is_locked)
    }
}

impl CellPack for TxLocks {
    fn pack(&self) -> Result<Cell, CellError> {
        let mut builder = Builder::new();
        self.withdrawal.store(&mut builder)?;
        self.borrowing.store(&mut builder)?;
        self.repayment.store(&mut builder)?;
        self.liquidation.store(&mut builder)?;
        builder.build()
    }
}

impl CellUnpack for TxLocks {
    fn unpack(cell: &Cell) -> Result<Self, FormatError> {
        let mut slice = cell.parse();
        let locks = TxLocks {
            withdrawal: TxLock::load(&mut slice)?,
            borrowing: TxLock::load(&mut slice)?,
            repayment: TxLock::load(&mut slice)?,
            liquidation: TxLock::load(&mut slice)?,
        };
        slice.end_parse()?;
        Ok(locks)
    }
}
