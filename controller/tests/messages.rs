use common_cells::{Address, Builder, Cell, CellPack, Slice};
use common_constants::{
    FORWARD_DEPOSIT, FORWARD_LIQUIDATE, FORWARD_PREFIX_BITS, FORWARD_REPAY, MESSAGE_OP_BITS,
    OP_BORROW_FROM_WALLET_TO_MASTER, OP_JETTON_TRANSFER, OP_WITHDRAW_FROM_WALLET_TO_MASTER,
    QUERY_ID_BITS, RESERVE_ID_BITS, VERSION_BITS,
};
use controller::{
    messages::{
        borrow_message, deposit_message, liquidate_message, repay_message, withdraw_body,
        withdraw_message,
    },
    AssetSource, Error, ForwardPayload, MasterRequest, OracleAttestation,
};
use num_bigint::BigUint;
use num_traits::Zero;

pub mod setup;
use setup::*;

const SYSTEM_VERSION: u16 = 3;

fn leaf(tag: u64) -> Cell {
    Builder::new().store_u64(tag, 16).unwrap().build().unwrap()
}

fn attestation() -> OracleAttestation {
    OracleAttestation {
        price_data: leaf(1),
        config_payload: leaf(2),
        config_signature: leaf(3),
    }
}

struct TransferFields {
    amount: BigUint,
    destination: Address,
    response: Address,
    forward_ton_amount: BigUint,
    forward_payload: Slice,
}

fn parse_transfer(body: &Cell) -> TransferFields {
    let mut slice = body.parse();
    assert_eq!(
        slice.load_u64(MESSAGE_OP_BITS).unwrap(),
        u64::from(OP_JETTON_TRANSFER)
    );
    assert_eq!(slice.load_u64(QUERY_ID_BITS).unwrap(), 0);
    let amount = slice.load_coins().unwrap();
    let destination = slice.load_address().unwrap();
    let response = slice.load_address().unwrap();
    assert!(slice.load_maybe_ref().unwrap().is_none());
    let forward_ton_amount = slice.load_coins().unwrap();
    let forward_payload = slice.load_maybe_ref().unwrap().unwrap().parse();
    slice.end_parse().unwrap();

    TransferFields {
        amount,
        destination,
        response,
        forward_ton_amount,
        forward_payload,
    }
}

fn assert_simple_payload(payload: &mut Slice, prefix: u8, reserve_id: u8) {
    assert_eq!(
        payload.load_u64(FORWARD_PREFIX_BITS).unwrap(),
        u64::from(prefix)
    );
    assert_eq!(
        payload.load_u64(RESERVE_ID_BITS).unwrap(),
        u64::from(reserve_id)
    );
    assert_eq!(
        payload.load_u64(VERSION_BITS).unwrap(),
        u64::from(SYSTEM_VERSION)
    );
    payload.end_parse().unwrap();
}

#[test]
fn native_deposit_goes_through_the_native_entry() {
    let config = testnet();
    let owner = address(0x11);
    let amount = BigUint::from(5_000_000_000u64);

    let message = deposit_message(
        &config,
        AssetSource::Native,
        TON_ID,
        SYSTEM_VERSION,
        amount.clone(),
        owner,
    )
    .unwrap();

    assert_eq!(message.destination, config.address_book.native_entry);
    assert_eq!(message.value, BigUint::from(5_200_000_000u64));

    let mut transfer = parse_transfer(&message.body);
    assert_eq!(transfer.amount, amount);
    assert_eq!(transfer.destination, Address::new(0, [0; 32]));
    assert_eq!(transfer.response, owner);
    assert!(transfer.forward_ton_amount.is_zero());
    assert_simple_payload(&mut transfer.forward_payload, FORWARD_DEPOSIT, TON_ID);
}

#[test]
fn jetton_deposit_goes_through_the_user_wallet() {
    let config = testnet();
    let owner = address(0x11);
    let wallet = address(0x33);
    let amount = BigUint::from(25_000_000u64);

    let message = deposit_message(
        &config,
        AssetSource::JettonWallet(&wallet),
        USDT_ID,
        SYSTEM_VERSION,
        amount.clone(),
        owner,
    )
    .unwrap();

    assert_eq!(message.destination, wallet);
    assert_eq!(message.value, BigUint::from(200_000_000u64));

    let mut transfer = parse_transfer(&message.body);
    assert_eq!(transfer.amount, amount);
    assert_eq!(transfer.destination, config.address_book.master);
    assert_eq!(transfer.forward_ton_amount, BigUint::from(100_000_000u64));
    assert_simple_payload(&mut transfer.forward_payload, FORWARD_DEPOSIT, USDT_ID);
}

#[test]
fn repay_uses_repay_prefix_and_fees() {
    let config = testnet();
    let message = repay_message(
        &config,
        AssetSource::Native,
        TON_ID,
        SYSTEM_VERSION,
        BigUint::from(1_000u64),
        address(0x11),
    )
    .unwrap();

    assert_eq!(message.value, BigUint::from(170_001_000u64));
    let mut transfer = parse_transfer(&message.body);
    assert_simple_payload(&mut transfer.forward_payload, FORWARD_REPAY, TON_ID);
}

#[test]
fn liquidate_payload_carries_target_and_oracle_data() {
    let config = testnet();
    let wallet = address(0x33);
    let target = address(0x44);
    let payload = ForwardPayload::Liquidate {
        debt_reserve_id: USDT_ID,
        system_version: SYSTEM_VERSION,
        target_wallet: target,
        collateral_reserve_id: TON_ID,
        attestation: attestation(),
    };

    let message = liquidate_message(
        &config,
        AssetSource::JettonWallet(&wallet),
        &payload,
        BigUint::from(10_000_000u64),
        address(0x11),
    )
    .unwrap();

    let mut forward = parse_transfer(&message.body).forward_payload;
    assert_eq!(
        forward.load_u64(FORWARD_PREFIX_BITS).unwrap(),
        u64::from(FORWARD_LIQUIDATE)
    );
    assert_eq!(
        forward.load_u64(RESERVE_ID_BITS).unwrap(),
        u64::from(USDT_ID)
    );
    assert_eq!(
        forward.load_u64(VERSION_BITS).unwrap(),
        u64::from(SYSTEM_VERSION)
    );
    assert_eq!(forward.load_address().unwrap(), target);
    assert_eq!(
        forward.load_u64(RESERVE_ID_BITS).unwrap(),
        u64::from(TON_ID)
    );
    let oracle = forward.load_ref().unwrap();
    forward.end_parse().unwrap();

    assert_eq!(oracle.refs(), &[leaf(1), leaf(2), leaf(3)]);
    assert_eq!(oracle.bit_len(), 0);
}

#[test]
fn forward_payload_prefixes() {
    let deposit = ForwardPayload::Deposit {
        reserve_id: 5,
        system_version: SYSTEM_VERSION,
    };
    let cell = deposit.pack().unwrap();

    assert_eq!(deposit.prefix(), FORWARD_DEPOSIT);
    assert_eq!(cell.bit_len(), FORWARD_PREFIX_BITS + RESERVE_ID_BITS + VERSION_BITS);
}

#[test]
fn withdraw_body_layout() {
    let request = MasterRequest {
        face_amount: BigUint::from(1_500_000_000u64),
        reserve_id: TON_ID,
        attestation: attestation(),
    };
    let body = withdraw_body(&request).unwrap();

    let mut slice = body.parse();
    assert_eq!(
        slice.load_u64(MESSAGE_OP_BITS).unwrap(),
        u64::from(OP_WITHDRAW_FROM_WALLET_TO_MASTER)
    );
    assert_eq!(slice.load_coins().unwrap(), request.face_amount);
    assert_eq!(
        slice.load_u64(RESERVE_ID_BITS).unwrap(),
        u64::from(TON_ID)
    );
    assert_eq!(slice.load_ref().unwrap(), leaf(1));
    assert_eq!(slice.load_ref().unwrap(), leaf(2));
    let holder = slice.load_ref().unwrap();
    slice.end_parse().unwrap();

    assert_eq!(holder.bit_len(), 0);
    assert_eq!(holder.refs(), &[leaf(3)]);
}

#[test]
fn master_requests_pay_fee_by_asset_kind() {
    let config = testnet();
    let native = MasterRequest {
        face_amount: BigUint::from(1u64),
        reserve_id: TON_ID,
        attestation: attestation(),
    };
    let jetton = MasterRequest {
        reserve_id: USDT_ID,
        ..native.clone()
    };

    let withdraw = withdraw_message(&config, &native).unwrap();
    assert_eq!(withdraw.destination, config.address_book.master);
    assert_eq!(withdraw.value, BigUint::from(170_000_000u64));

    let borrow = borrow_message(&config, &jetton).unwrap();
    assert_eq!(borrow.destination, config.address_book.master);
    assert_eq!(borrow.value, BigUint::from(170_000_000u64));
    assert_eq!(
        borrow.body.parse().load_u64(MESSAGE_OP_BITS).unwrap(),
        u64::from(OP_BORROW_FROM_WALLET_TO_MASTER)
    );
}

#[test]
fn unknown_reserves_are_rejected() {
    let config = testnet();

    assert_eq!(
        deposit_message(
            &config,
            AssetSource::Native,
            9,
            SYSTEM_VERSION,
            BigUint::from(1u64),
            address(0x11),
        ),
        Err(Error::UnknownReserve(9))
    );

    let request = MasterRequest {
        face_amount: BigUint::from(1u64),
        reserve_id: 9,
        attestation: attestation(),
    };
    assert_eq!(
        withdraw_message(&config, &request),
        Err(Error::UnknownReserve(9))
    );
}
