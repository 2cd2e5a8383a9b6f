#![allow(dead_code)]

use std::{
    cell::RefCell,
    collections::{BTreeMap, VecDeque},
    str::FromStr,
};

use common_cells::{Address, Cell};
use common_structs::{
    InterestRateModel, ReserveAccumulators, ReserveConfig, ReserveState, ReserveTotals, UserVars,
};
use controller::{
    ChainError, ChainReader, ChainWriter, DeploymentConfig, OutboundMessage, StackValue,
};
use num_bigint::BigUint;
use num_traits::Zero;

pub const LAST_UPDATE: u64 = 1_729_600_000;
pub const ONE_HOUR: u64 = 3_600;

pub const TON_ID: u8 = 0;
pub const USDT_ID: u8 = 1;

pub const TON_PRICE: u64 = 550_000_000;
pub const USDT_PRICE: u64 = 100_000_000;

pub static TESTNET: &str = include_str!("../../deployments/testnet.toml");

pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub fn big(value: &str) -> BigUint {
    BigUint::parse_bytes(value.as_bytes(), 10).unwrap()
}

pub fn address(byte: u8) -> Address {
    Address::new(0, [byte; 32])
}

pub fn raw_address(raw: &str) -> Address {
    Address::from_str(raw).unwrap()
}

pub fn testnet() -> DeploymentConfig {
    DeploymentConfig::from_toml_str(TESTNET).unwrap()
}

/// Native coin reserve, 9 decimals, 75% collateral factor, 90% borrow factor.
pub fn ton_reserve() -> ReserveState {
    ReserveState {
        config: ReserveConfig {
            enabled: true,
            decimals: 9,
            borrow_factor: 90,
            collateral_factor: 75,
            reserve_factor: 10,
            liquidation_bonus: 5,
            debt_limit: BigUint::zero(),
            jetton_wallet_code: Cell::empty(),
        },
        accumulators: ReserveAccumulators {
            last_update_timestamp: LAST_UPDATE,
            lending_accumulator: big("1000000320586022935070387176"),
            debt_accumulator: big("1000000000564234572341374307"),
            current_lending_rate: big("61728395061728395061728394"),
            current_borrowing_rate: big("185185185185185185185185185"),
            total_raw_amount_to_treasury: BigUint::zero(),
        },
        totals: ReserveTotals {
            total_raw_available: big("12315124512124412441"),
            total_raw_debt: big("24512124412441"),
        },
        rate_model: InterestRateModel {
            slope0: 50,
            slope1: 80,
            y_intercept: 0,
            optimal_rate: 90,
        },
    }
}

/// Stablecoin reserve, 6 decimals, accumulators at exactly one.
pub fn usdt_reserve() -> ReserveState {
    let one = big("1000000000000000000000000000");
    ReserveState {
        config: ReserveConfig {
            enabled: true,
            decimals: 6,
            borrow_factor: 90,
            collateral_factor: 80,
            reserve_factor: 10,
            liquidation_bonus: 5,
            debt_limit: BigUint::zero(),
            jetton_wallet_code: Cell::empty(),
        },
        accumulators: ReserveAccumulators {
            last_update_timestamp: LAST_UPDATE,
            lending_accumulator: one.clone(),
            debt_accumulator: one,
            current_lending_rate: BigUint::zero(),
            current_borrowing_rate: BigUint::zero(),
            total_raw_amount_to_treasury: BigUint::zero(),
        },
        totals: ReserveTotals {
            total_raw_available: BigUint::from(1_000_000_000_000u64),
            total_raw_debt: BigUint::zero(),
        },
        rate_model: InterestRateModel {
            slope0: 10,
            slope1: 100,
            y_intercept: 2,
            optimal_rate: 80,
        },
    }
}

pub fn user_vars(deposits: &[(u8, u64)], debts: &[(u8, u64)]) -> UserVars {
    UserVars {
        owner: address(0x11),
        master: address(0x22),
        raw_deposits: deposits
            .iter()
            .map(|(id, amount)| (*id, BigUint::from(*amount)))
            .collect(),
        raw_debts: debts
            .iter()
            .map(|(id, amount)| (*id, BigUint::from(*amount)))
            .collect(),
        user_code: Cell::empty(),
        additional_data: None,
    }
}

/// Recorded get-method call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GetMethodCall {
    pub address: Address,
    pub method: String,
    pub args: Vec<StackValue>,
}

/// In-memory chain: canned get-method answers per `(address, method)`,
/// consumed in order, plus a log of everything asked and sent.
#[derive(Default)]
pub struct ChainMock {
    answers: RefCell<BTreeMap<(Address, String), VecDeque<Result<Vec<StackValue>, ChainError>>>>,
    pub calls: RefCell<Vec<GetMethodCall>>,
    pub sent: RefCell<Vec<OutboundMessage>>,
}

impl ChainMock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn answer(&self, address: Address, method: &str, stack: Vec<StackValue>) -> &Self {
        self.answers
            .borrow_mut()
            .entry((address, method.to_owned()))
            .or_default()
            .push_back(Ok(stack));
        self
    }

    pub fn fail(&self, address: Address, method: &str, reason: &str) -> &Self {
        self.answers
            .borrow_mut()
            .entry((address, method.to_owned()))
            .or_default()
            .push_back(Err(ChainError::Provider(reason.to_owned())));
        self
    }

    pub fn last_call(&self) -> GetMethodCall {
        self.calls.borrow().last().cloned().unwrap()
    }
}

impl ChainReader for ChainMock {
    fn run_get_method(
        &self,
        address: &Address,
        method: &str,
        args: &[StackValue],
    ) -> Result<Vec<StackValue>, ChainError> {
        self.calls.borrow_mut().push(GetMethodCall {
            address: *address,
            method: method.to_owned(),
            args: args.to_vec(),
        });
        self.answers
            .borrow_mut()
            .get_mut(&(*address, method.to_owned()))
            .and_then(VecDeque::pop_front)
            .unwrap_or_else(|| Err(ChainError::Provider(format!("no answer for {method}"))))
    }
}

impl ChainWriter for ChainMock {
    fn send(&self, message: OutboundMessage) -> Result<(), ChainError> {
        self.sent.borrow_mut().push(message);
        Ok(())
    }
}
