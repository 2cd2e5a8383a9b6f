use common_cells::{Builder, Cell, CellError, CellPack, CellUnpack, FormatError};
use common_structs::{
    InterestRateModel, ReserveAccumulators, ReserveConfig, ReserveState, ReserveTotals, TonBool,
};
use num_bigint::BigUint;

fn big(value: &str) -> BigUint {
    BigUint::parse_bytes(value.as_bytes(), 10).unwrap()
}

fn wallet_code() -> Cell {
    Builder::new().store_u64(0xC0DE, 16).unwrap().build().unwrap()
}

fn sample_reserve() -> ReserveState {
    ReserveState {
        config: ReserveConfig {
            enabled: true,
            decimals: 9,
            borrow_factor: 90,
            collateral_factor: 75,
            reserve_factor: 10,
            liquidation_bonus: 5,
            debt_limit: big("1000000000000000000"),
            jetton_wallet_code: wallet_code(),
        },
        accumulators: ReserveAccumulators {
            last_update_timestamp: 1_729_600_000,
            lending_accumulator: big("1000000320586022935070387176"),
            debt_accumulator: big("1000000000564234572341374307"),
            current_lending_rate: big("61728395061728395061728394"),
            current_borrowing_rate: big("185185185185185185185185185"),
            total_raw_amount_to_treasury: big("1231541"),
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

#[test]
fn reserve_round_trip_through_bytes() {
    let reserve = sample_reserve();
    let bytes = reserve.to_boc().unwrap();

    let decoded = ReserveState::from_boc(&bytes).unwrap();
    assert_eq!(decoded, reserve);
    assert_eq!(decoded.to_boc().unwrap(), bytes);
}

#[test]
fn reserve_top_cell_is_four_refs_only() {
    let cell = sample_reserve().pack().unwrap();
    assert_eq!(cell.bit_len(), 0);
    assert_eq!(cell.refs().len(), 4);

    // config: 2 + 5 * 8 + 256 bits and the wallet code ref
    let config = cell.reference(0).unwrap();
    assert_eq!(config.bit_len(), 2 + 40 + 256);
    assert_eq!(config.refs().len(), 1);

    let accumulators = cell.reference(1).unwrap();
    assert_eq!(accumulators.bit_len(), 64 + 100 + 100 + 128 + 128 + 256);
    assert_eq!(cell.reference(2).unwrap().bit_len(), 512);
    assert_eq!(cell.reference(3).unwrap().bit_len(), 32);
}

#[test]
fn disabled_reserve_encodes_false() {
    let mut reserve = sample_reserve();
    reserve.config.enabled = false;
    let config = reserve.config.pack().unwrap();
    assert_eq!(config.parse().load_u64(2).unwrap(), 0);

    let decoded = ReserveConfig::unpack(&config).unwrap();
    assert!(!decoded.enabled);
}

#[test]
fn illegal_enabled_flag_is_rejected() {
    for illegal in [1i64, -2] {
        let mut builder = Builder::new();
        builder.store_i64(illegal, 2).unwrap();
        builder
            .store_u64(9, 8)
            .unwrap()
            .store_u64(0, 32)
            .unwrap()
            .store_uint(&BigUint::from(0u8), 256)
            .unwrap()
            .store_ref(wallet_code())
            .unwrap();
        let cell = builder.build().unwrap();
        assert_eq!(
            ReserveConfig::unpack(&cell).unwrap_err(),
            FormatError::InvalidBoolean(illegal)
        );
    }
}

#[test]
fn leftover_bits_are_rejected() {
    let model = Builder::new()
        .store_u64(0x32_50_00_5a, 32)
        .unwrap()
        .store_bit(true)
        .unwrap()
        .build()
        .unwrap();
    assert_eq!(
        InterestRateModel::unpack(&model).unwrap_err(),
        FormatError::Cell(CellError::UnreadData { bits: 1, refs: 0 })
    );
}

#[test]
fn reserve_with_missing_part_is_rejected() {
    let reserve = sample_reserve();
    let cell = Builder::new()
        .store_ref(reserve.config.pack().unwrap())
        .unwrap()
        .store_ref(reserve.accumulators.pack().unwrap())
        .unwrap()
        .store_ref(reserve.totals.pack().unwrap())
        .unwrap()
        .build()
        .unwrap();
    assert_eq!(
        ReserveState::unpack(&cell).unwrap_err(),
        FormatError::Cell(CellError::NoMoreRefs)
    );
}

#[test]
fn y_intercept_is_not_bounded_on_decode() {
    let model = InterestRateModel {
        slope0: 50,
        slope1: 80,
        y_intercept: 200,
        optimal_rate: 90,
    };
    let decoded = InterestRateModel::unpack(&model.pack().unwrap()).unwrap();
    assert_eq!(decoded.y_intercept, 200);
}

#[test]
fn percentage_accessors_validate_range() {
    let mut config = sample_reserve().config;
    assert_eq!(config.collateral_factor_pct().unwrap().value(), 75);
    config.borrow_factor = 101;
    assert!(config.borrow_factor_pct().is_err());
}

#[test]
fn ton_bool_values() {
    assert_eq!(TonBool::from_int(-1).unwrap(), TonBool::TRUE);
    assert_eq!(TonBool::from_int(0).unwrap(), TonBool::FALSE);
    assert_eq!(
        TonBool::from_int(1).unwrap_err(),
        FormatError::InvalidBoolean(1)
    );
    assert_eq!(TonBool::TRUE.as_int(), -1);
    assert!(bool::from(TonBool::from(true)));
}
