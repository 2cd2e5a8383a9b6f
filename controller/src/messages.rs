//! Bodies of the messages a client sends to the protocol.
//!
//! Deposits, repayments and liquidations travel as jetton transfers whose
//! forward payload tells the master what to do; withdrawals and borrows go to
//! the master directly, together with an oracle attestation.

use common_cells::{Address, Builder, Cell, CellError, CellPack};
use common_constants::{
    BASECHAIN, FORWARD_DEPOSIT, FORWARD_LIQUIDATE, FORWARD_PREFIX_BITS, FORWARD_REPAY,
    MESSAGE_OP_BITS, OP_BORROW_FROM_WALLET_TO_MASTER, OP_JETTON_TRANSFER,
    OP_WITHDRAW_FROM_WALLET_TO_MASTER, QUERY_ID_BITS, RESERVE_ID_BITS, VERSION_BITS,
};
use num_bigint::BigUint;
use num_traits::Zero;

use crate::{
    config::{ActionFee, DeploymentConfig},
    errors::Error,
    oracle::OracleAttestation,
};

/// A message ready for a [`crate::ChainWriter`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundMessage {
    pub destination: Address,
    /// Attached value in nano-units.
    pub value: BigUint,
    pub body: Cell,
}

/// Withdraw or borrow request addressed to the master contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MasterRequest {
    pub face_amount: BigUint,
    pub reserve_id: u8,
    pub attestation: OracleAttestation,
}

/// `op:32 coins reserve_id:6 ^price_data ^config_payload ^(^config_signature)`
fn master_request_body(op: u32, request: &MasterRequest) -> Result<Cell, CellError> {
    let signature_holder = Builder::new()
        .store_ref(request.attestation.config_signature.clone())?
        .build()?;

    Builder::new()
        .store_u64(op.into(), MESSAGE_OP_BITS)?
        .store_coins(&request.face_amount)?
        .store_u64(request.reserve_id.into(), RESERVE_ID_BITS)?
        .store_ref(request.attestation.price_data.clone())?
        .store_ref(request.attestation.config_payload.clone())?
        .store_ref(signature_holder)?
        .build()
}

pub fn withdraw_body(request: &MasterRequest) -> Result<Cell, CellError> {
    master_request_body(OP_WITHDRAW_FROM_WALLET_TO_MASTER, request)
}

pub fn borrow_body(request: &MasterRequest) -> Result<Cell, CellError> {
    master_request_body(OP_BORROW_FROM_WALLET_TO_MASTER, request)
}

/// Instruction carried in a transfer's forward payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ForwardPayload {
    Deposit {
        reserve_id: u8,
        system_version: u16,
    },
    Repay {
        reserve_id: u8,
        system_version: u16,
    },
    Liquidate {
        debt_reserve_id: u8,
        system_version: u16,
        target_wallet: Address,
        collateral_reserve_id: u8,
        attestation: OracleAttestation,
    },
}

impl ForwardPayload {
    pub fn prefix(&self) -> u8 {
        match self {
            ForwardPayload::Deposit { .. } => FORWARD_DEPOSIT,
            ForwardPayload::Repay { .. } => FORWARD_REPAY,
            ForwardPayload::Liquidate { .. } => FORWARD_LIQUIDATE,
        }
    }
}

impl CellPack for ForwardPayload {
    fn pack(&self) -> Result<Cell, CellError> {
        let mut builder = Builder::new();
        builder.store_u64(self.prefix().into(), FORWARD_PREFIX_BITS)?;

        match self {
            ForwardPayload::Deposit {
                reserve_id,
                system_version,
            }
            | ForwardPayload::Repay {
                reserve_id,
                system_version,
            } => {
                builder
                    .store_u64((*reserve_id).into(), RESERVE_ID_BITS)?
                    .store_u64((*system_version).into(), VERSION_BITS)?;
            },
            ForwardPayload::Liquidate {
                debt_reserve_id,
                system_version,
                target_wallet,
                collateral_reserve_id,
                attestation,
            } => {
                let oracle = Builder::new()
                    .store_ref(attestation.price_data.clone())?
                    .store_ref(attestation.config_payload.clone())?
                    .store_ref(attestation.config_signature.clone())?
                    .build()?;
                builder
                    .store_u64((*debt_reserve_id).into(), RESERVE_ID_BITS)?
                    .store_u64((*system_version).into(), VERSION_BITS)?
                    .store_address(target_wallet)?
                    .store_u64((*collateral_reserve_id).into(), RESERVE_ID_BITS)?
                    .store_ref(oracle)?;
            },
        }

        builder.build()
    }
}

/// Standard jetton `transfer` body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JettonTransfer {
    pub query_id: u64,
    pub amount: BigUint,
    pub destination: Address,
    pub response_destination: Address,
    pub custom_payload: Option<Cell>,
    pub forward_ton_amount: BigUint,
    pub forward_payload: Option<Cell>,
}

impl JettonTransfer {
    /// Native coin entry: same layout, with a zero destination and nothing
    /// forwarded since the fee travels with the message value.
    pub fn to_native_entry(
        amount: BigUint,
        response_destination: Address,
        forward_payload: Cell,
    ) -> Self {
        JettonTransfer {
            query_id: 0,
            amount,
            destination: Address::new(BASECHAIN, [0; 32]),
            response_destination,
            custom_payload: None,
            forward_ton_amount: BigUint::zero(),
            forward_payload: Some(forward_payload),
        }
    }
}

impl CellPack for JettonTransfer {
    fn pack(&self) -> Result<Cell, CellError> {
        Builder::new()
            .store_u64(OP_JETTON_TRANSFER.into(), MESSAGE_OP_BITS)?
            .store_u64(self.query_id, QUERY_ID_BITS)?
            .store_coins(&self.amount)?
            .store_address(&self.destination)?
            .store_address(&self.response_destination)?
            .store_maybe_ref(self.custom_payload.clone())?
            .store_coins(&self.forward_ton_amount)?
            .store_maybe_ref(self.forward_payload.clone())?
            .build()
    }
}

/// Where an asset leaves the user from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetSource<'a> {
    Native,
    /// The user's own jetton wallet for the reserve's minter.
    JettonWallet(&'a Address),
}

/// Transfer that hands `amount` to the protocol with `payload` attached.
///
/// # Arguments
/// - `config`: Deployment the message targets.
/// - `fee`: Fee entry of the action being performed.
/// - `source`: Native coin or the user's jetton wallet.
/// - `amount`: Native amount in the reserve's smallest unit.
/// - `response_destination`: Where excess value is returned.
pub fn transfer_message(
    config: &DeploymentConfig,
    fee: &ActionFee,
    source: AssetSource<'_>,
    amount: BigUint,
    response_destination: Address,
    payload: &ForwardPayload,
) -> Result<OutboundMessage, Error> {
    let forward_payload = payload.pack()?;

    let message = match source {
        AssetSource::Native => OutboundMessage {
            destination: config.address_book.native_entry,
            value: BigUint::from(fee.native) + &amount,
            body: JettonTransfer::to_native_entry(amount, response_destination, forward_payload)
                .pack()?,
        },
        AssetSource::JettonWallet(wallet) => OutboundMessage {
            destination: *wallet,
            value: BigUint::from(fee.jetton_total),
            body: JettonTransfer {
                query_id: 0,
                amount,
                destination: config.address_book.master,
                response_destination,
                custom_payload: None,
                forward_ton_amount: BigUint::from(fee.jetton_forward),
                forward_payload: Some(forward_payload),
            }
            .pack()?,
        },
    };
    Ok(message)
}

pub fn deposit_message(
    config: &DeploymentConfig,
    source: AssetSource<'_>,
    reserve_id: u8,
    system_version: u16,
    amount: BigUint,
    response_destination: Address,
) -> Result<OutboundMessage, Error> {
    config.reserve(reserve_id)?;
    let payload = ForwardPayload::Deposit {
        reserve_id,
        system_version,
    };
    transfer_message(config, &config.fees.deposit, source, amount, response_destination, &payload)
}

pub fn repay_message(
    config: &DeploymentConfig,
    source: AssetSource<'_>,
    reserve_id: u8,
    system_version: u16,
    amount: BigUint,
    response_destination: Address,
) -> Result<OutboundMessage, Error> {
    config.reserve(reserve_id)?;
    let payload = ForwardPayload::Repay {
        reserve_id,
        system_version,
    };
    transfer_message(config, &config.fees.repay, source, amount, response_destination, &payload)
}

/// Repays `amount` of the target's debt and seizes collateral in return.
/// `payload` must be a [`ForwardPayload::Liquidate`].
pub fn liquidate_message(
    config: &DeploymentConfig,
    source: AssetSource<'_>,
    payload: &ForwardPayload,
    amount: BigUint,
    response_destination: Address,
) -> Result<OutboundMessage, Error> {
    if let ForwardPayload::Liquidate {
        debt_reserve_id,
        collateral_reserve_id,
        ..
    } = payload
    {
        config.reserve(*debt_reserve_id)?;
        config.reserve(*collateral_reserve_id)?;
    }
    transfer_message(config, &config.fees.liquidate, source, amount, response_destination, payload)
}

fn master_request_fee(
    config: &DeploymentConfig,
    fee: &ActionFee,
    reserve_id: u8,
) -> Result<BigUint, Error> {
    let value = if config.reserve(reserve_id)?.is_native() {
        fee.native
    } else {
        fee.jetton_total
    };
    Ok(BigUint::from(value))
}

pub fn withdraw_message(
    config: &DeploymentConfig,
    request: &MasterRequest,
) -> Result<OutboundMessage, Error> {
    Ok(OutboundMessage {
        destination: config.address_book.master,
        value: master_request_fee(config, &config.fees.withdraw, request.reserve_id)?,
        body: withdraw_body(request)?,
    })
}

pub fn borrow_message(
    config: &DeploymentConfig,
    request: &MasterRequest,
) -> Result<OutboundMessage, Error> {
    Ok(OutboundMessage {
        destination: config.address_book.master,
        value: master_request_fee(config, &config.fees.borrow, request.reserve_id)?,
        body: borrow_body(request)?,
    })
}
