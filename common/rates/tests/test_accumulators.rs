use common_cells::Cell;
use common_errors::RangeError;
use common_rates::{debt_accumulator_at, lending_accumulator_at, pending_treasury_amount};
use common_structs::{
    InterestRateModel, ReserveAccumulators, ReserveConfig, ReserveState, ReserveTotals,
};
use num_bigint::BigUint;
use num_traits::Zero;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

const LAST_UPDATE: u64 = 1_729_600_000;
const ONE_YEAR: u64 = 31_536_000;

fn big(value: &str) -> BigUint {
    BigUint::parse_bytes(value.as_bytes(), 10).unwrap()
}

fn reserve(reserve_factor: u8) -> ReserveState {
    ReserveState {
        config: ReserveConfig {
            enabled: true,
            decimals: 9,
            borrow_factor: 90,
            collateral_factor: 75,
            reserve_factor,
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

#[test]
fn accumulators_are_unchanged_at_last_update() {
    let reserve = reserve(10);

    assert_eq!(
        lending_accumulator_at(&reserve, LAST_UPDATE).unwrap().into_raw(),
        reserve.accumulators.lending_accumulator
    );
    assert_eq!(
        debt_accumulator_at(&reserve, LAST_UPDATE).unwrap().into_raw(),
        reserve.accumulators.debt_accumulator
    );
    assert!(pending_treasury_amount(&reserve, LAST_UPDATE)
        .unwrap()
        .is_zero());
}

#[test]
fn accrual_over_one_hour() {
    let reserve = reserve(10);
    let at = LAST_UPDATE + 3600;

    assert_eq!(
        lending_accumulator_at(&reserve, at).unwrap().into_raw(),
        big("1000006662546452831207722730")
    );
    assert_eq!(
        debt_accumulator_at(&reserve, at).unwrap().into_raw(),
        big("1000021140425569009906323177")
    );
    assert_eq!(
        pending_treasury_amount(&reserve, at).unwrap(),
        big("8678003593904")
    );
}

#[test]
fn accrual_over_one_year() {
    let reserve = reserve(10);
    let at = LAST_UPDATE + ONE_YEAR;

    assert_eq!(
        lending_accumulator_at(&reserve, at).unwrap().into_raw(),
        big("1055555893951913098129853128")
    );
    assert_eq!(
        debt_accumulator_at(&reserve, at).unwrap().into_raw(),
        big("1185185185853907641293480659")
    );
    assert_eq!(
        pending_treasury_amount(&reserve, at).unwrap(),
        big("76019311482600010")
    );
}

#[test]
fn full_reserve_factor_freezes_lending_side() {
    let reserve = reserve(100);
    let at = LAST_UPDATE + ONE_YEAR;

    assert_eq!(
        lending_accumulator_at(&reserve, at).unwrap().into_raw(),
        reserve.accumulators.lending_accumulator
    );
    assert!(!pending_treasury_amount(&reserve, at).unwrap().is_zero());
}

#[test]
fn zero_reserve_factor_sends_nothing_to_treasury() {
    let reserve = reserve(0);
    assert!(pending_treasury_amount(&reserve, LAST_UPDATE + ONE_YEAR)
        .unwrap()
        .is_zero());
}

#[test]
fn time_going_backwards_fails() {
    let reserve = reserve(10);
    let expected = RangeError::TimeWentBackwards {
        last_update: LAST_UPDATE,
        target: LAST_UPDATE - 1,
    };

    assert_eq!(lending_accumulator_at(&reserve, LAST_UPDATE - 1), Err(expected));
    assert_eq!(debt_accumulator_at(&reserve, LAST_UPDATE - 1), Err(expected));
    assert_eq!(pending_treasury_amount(&reserve, LAST_UPDATE - 1), Err(expected));
}

#[test]
fn reserve_factor_above_hundred_fails() {
    let reserve = reserve(101);
    assert_eq!(
        lending_accumulator_at(&reserve, LAST_UPDATE),
        Err(RangeError::PercentageOutOfRange(101))
    );
    assert_eq!(
        pending_treasury_amount(&reserve, LAST_UPDATE + 1),
        Err(RangeError::PercentageOutOfRange(101))
    );
}

#[test]
fn accumulators_never_decrease_over_time() {
    let mut rng = ChaCha8Rng::seed_from_u64(0xACC0);
    let mut reserve = reserve(10);

    for _ in 0..200 {
        reserve.accumulators.current_lending_rate = BigUint::from(rng.random::<u64>()) << 24;
        reserve.accumulators.current_borrowing_rate = BigUint::from(rng.random::<u64>()) << 24;
        let earlier = LAST_UPDATE + rng.random_range(0..ONE_YEAR);
        let later = earlier + rng.random_range(0..ONE_YEAR);

        let lending_earlier = lending_accumulator_at(&reserve, earlier).unwrap().into_raw();
        let lending_later = lending_accumulator_at(&reserve, later).unwrap().into_raw();
        assert!(lending_earlier >= reserve.accumulators.lending_accumulator);
        assert!(lending_later >= lending_earlier);

        let debt_earlier = debt_accumulator_at(&reserve, earlier).unwrap().into_raw();
        let debt_later = debt_accumulator_at(&reserve, later).unwrap().into_raw();
        assert!(debt_earlier >= reserve.accumulators.debt_accumulator);
        assert!(debt_later >= debt_earlier);
    }
}
