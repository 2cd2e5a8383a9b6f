use common_errors::RangeError;
use common_math::Percentage;
use controller::{
    AccountHealth, BorrowTarget, CollateralInfo, Collateralization, DebtInfo, Error, ReserveCache,
};
use num_bigint::{BigInt, BigUint};
use num_traits::{Signed, Zero};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::collections::BTreeMap;

pub mod setup;
use setup::*;

fn pct(value: u8) -> Percentage {
    Percentage::new(value).unwrap()
}

fn hundred_ton(collateral_factor: u8) -> CollateralInfo {
    CollateralInfo {
        native_amount: BigUint::from(100_000_000_000u64),
        native_decimals: 9,
        collateral_factor: pct(collateral_factor),
        price_8dec: BigUint::from(TON_PRICE),
    }
}

fn usdt_debt(amount: u64, borrow_factor: u8) -> DebtInfo {
    DebtInfo {
        native_amount: BigUint::from(amount),
        native_decimals: 6,
        borrow_factor: pct(borrow_factor),
        price_8dec: BigUint::from(USDT_PRICE),
    }
}

fn usdt_target() -> BorrowTarget {
    BorrowTarget {
        native_decimals: 6,
        borrow_factor: pct(90),
        price_8dec: BigUint::from(USDT_PRICE),
    }
}

#[test]
fn collateral_is_discounted_by_collateral_factor() {
    // 100 TON at $5.50 is $550, half of it counts.
    assert_eq!(
        Collateralization::value_collateral(&hundred_ton(50)).unwrap(),
        BigUint::from(27_500_000_000u64)
    );
    assert!(Collateralization::value_collateral(&hundred_ton(0))
        .unwrap()
        .is_zero());
}

#[test]
fn debt_is_exaggerated_by_borrow_factor() {
    assert_eq!(
        Collateralization::value_debt(&usdt_debt(10_000_000, 90)).unwrap(),
        BigUint::from(1_111_111_111u64)
    );
    assert_eq!(
        Collateralization::value_debt(&usdt_debt(10_000_000, 100)).unwrap(),
        BigUint::from(1_000_000_000u64)
    );
}

#[test]
fn zero_borrow_factor_leaves_debt_unweighted() {
    assert_eq!(
        Collateralization::value_debt(&usdt_debt(10_000_000, 0)).unwrap(),
        BigUint::from(1_000_000_000u64)
    );
}

#[test]
fn running_totals_accumulate() {
    let mut position = Collateralization::new();
    assert!(position.ratio().is_none());
    assert!(position.is_solvent());

    let added = position.add_collateral(&hundred_ton(50)).unwrap();
    assert_eq!(added, BigUint::from(27_500_000_000u64));
    position.add_collateral(&hundred_ton(50)).unwrap();
    position.add_debt(&usdt_debt(10_000_000, 90)).unwrap();

    assert_eq!(
        position.discounted_collateral_usd(),
        &BigUint::from(55_000_000_000u64)
    );
    assert_eq!(position.debt_usd(), &BigUint::from(1_111_111_111u64));
    assert!(position.is_solvent());

    let ratio = position.ratio().unwrap();
    assert!((ratio - 49.5).abs() < 1e-6);
}

#[test]
fn requirement_reports_both_totals() {
    let totals =
        Collateralization::requirement(&[hundred_ton(50)], &[usdt_debt(10_000_000, 90)]).unwrap();

    assert_eq!(
        totals.total_discounted_face_deposit,
        BigUint::from(27_500_000_000u64)
    );
    assert_eq!(
        totals.total_collateral_required,
        BigUint::from(1_111_111_111u64)
    );
}

#[test]
fn max_borrow_capacity_in_stablecoin() {
    let capacity = Collateralization::max_borrow_capacity(
        &[hundred_ton(50)],
        &[usdt_debt(10_000_000, 90)],
        &usdt_target(),
    )
    .unwrap();

    // 237.5 USDT
    assert_eq!(capacity, BigInt::from(237_500_000));
}

#[test]
fn max_borrow_capacity_uses_target_decimals() {
    let target = BorrowTarget {
        native_decimals: 9,
        borrow_factor: pct(90),
        price_8dec: BigUint::from(TON_PRICE),
    };
    let capacity = Collateralization::max_borrow_capacity(
        &[hundred_ton(50)],
        &[usdt_debt(10_000_000, 90)],
        &target,
    )
    .unwrap();

    assert_eq!(capacity, BigInt::from(43_181_818_181i64));
}

#[test]
fn max_borrow_capacity_is_negative_when_undercollateralized() {
    init_logger();
    let one_ton = CollateralInfo {
        native_amount: BigUint::from(1_000_000_000u64),
        ..hundred_ton(50)
    };
    let capacity = Collateralization::max_borrow_capacity(
        &[one_ton],
        &[usdt_debt(1_000_000_000, 90)],
        &usdt_target(),
    )
    .unwrap();

    assert_eq!(capacity, BigInt::from(-997_524_999i64));
}

#[test]
fn max_borrow_capacity_rejects_zero_price() {
    let target = BorrowTarget {
        price_8dec: BigUint::zero(),
        ..usdt_target()
    };

    assert_eq!(
        Collateralization::max_borrow_capacity(&[hundred_ton(50)], &[], &target),
        Err(RangeError::DivisionByZero)
    );
}

#[test]
fn borrowing_the_full_capacity_keeps_the_position_solvent() {
    let mut rng = ChaCha8Rng::seed_from_u64(7);

    for _ in 0..500 {
        let collaterals: Vec<CollateralInfo> = (0..rng.random_range(1..4))
            .map(|_| CollateralInfo {
                native_amount: BigUint::from(rng.random_range(1..1_000_000_000_000u64)),
                native_decimals: rng.random_range(0..19),
                collateral_factor: pct(rng.random_range(0..=100)),
                price_8dec: BigUint::from(rng.random_range(1..100_000_000_000u64)),
            })
            .collect();
        let debts: Vec<DebtInfo> = (0..rng.random_range(0..3))
            .map(|_| DebtInfo {
                native_amount: BigUint::from(rng.random_range(0..1_000_000_000u64)),
                native_decimals: rng.random_range(0..19),
                borrow_factor: pct(rng.random_range(1..=100)),
                price_8dec: BigUint::from(rng.random_range(1..100_000_000_000u64)),
            })
            .collect();
        let target = BorrowTarget {
            native_decimals: rng.random_range(0..19),
            borrow_factor: pct(rng.random_range(1..=100)),
            price_8dec: BigUint::from(rng.random_range(1..100_000_000_000u64)),
        };

        let before = Collateralization::requirement(&collaterals, &debts).unwrap();
        let room = BigInt::from(before.total_discounted_face_deposit.clone())
            - BigInt::from(before.total_collateral_required.clone());
        let capacity = Collateralization::max_borrow_capacity(&collaterals, &debts, &target)
            .unwrap();
        if room.is_negative() {
            assert!(!capacity.is_positive());
            continue;
        }

        let mut all_debts = debts.clone();
        all_debts.push(DebtInfo {
            native_amount: capacity.to_biguint().unwrap(),
            native_decimals: target.native_decimals,
            borrow_factor: target.borrow_factor,
            price_8dec: target.price_8dec.clone(),
        });
        let after = Collateralization::requirement(&collaterals, &all_debts).unwrap();
        assert!(after.total_collateral_required <= after.total_discounted_face_deposit);

        // What is left over comes from flooring only.
        let used = BigInt::from(after.total_collateral_required)
            - BigInt::from(before.total_collateral_required);
        let unit_price = BigInt::from(target.price_8dec.clone())
            / BigInt::from(10u64).pow(target.native_decimals);
        let bf = BigInt::from(target.borrow_factor.value());
        assert!((room - used) * bf.clone() <= (unit_price + 3) * 100 + bf * 2);
    }
}

fn caches_at(timestamp: u64) -> BTreeMap<u8, ReserveCache> {
    BTreeMap::from([
        (TON_ID, ReserveCache::new(TON_ID, ton_reserve(), timestamp).unwrap()),
        (USDT_ID, ReserveCache::new(USDT_ID, usdt_reserve(), timestamp).unwrap()),
    ])
}

fn prices() -> BTreeMap<u8, BigUint> {
    BTreeMap::from([
        (TON_ID, BigUint::from(TON_PRICE)),
        (USDT_ID, BigUint::from(USDT_PRICE)),
    ])
}

#[test]
fn account_health_values_user_balances() {
    init_logger();
    let user = user_vars(&[(TON_ID, 5_000_000_000), (USDT_ID, 0)], &[(USDT_ID, 3_000_000)]);
    let caches = caches_at(LAST_UPDATE + ONE_HOUR);

    let health = AccountHealth::evaluate(&user, &caches, &prices()).unwrap();

    assert_eq!(health.collaterals().len(), 1);
    assert_eq!(
        health.collaterals()[&TON_ID].native_amount,
        BigUint::from(5_000_033_312u64)
    );
    assert_eq!(
        health.collateralization().discounted_collateral_usd(),
        &BigUint::from(2_062_513_740u64)
    );
    assert_eq!(
        health.collateralization().debt_usd(),
        &BigUint::from(333_333_333u64)
    );
    assert!(health.is_solvent());

    let capacity = health
        .borrow_capacity(&caches[&USDT_ID], &BigUint::from(USDT_PRICE))
        .unwrap();
    assert_eq!(capacity, BigInt::from(15_562_623));
}

#[test]
fn account_health_without_balances_is_solvent() {
    let health =
        AccountHealth::evaluate(&user_vars(&[], &[]), &caches_at(LAST_UPDATE), &prices()).unwrap();

    assert!(health.is_solvent());
    assert!(health.ratio().is_none());
}

#[test]
fn account_health_needs_a_cache_and_a_price() {
    let user = user_vars(&[(7, 1_000)], &[]);
    assert_eq!(
        AccountHealth::evaluate(&user, &caches_at(LAST_UPDATE), &prices()),
        Err(Error::UnknownReserve(7))
    );

    let user = user_vars(&[], &[(USDT_ID, 1_000)]);
    let only_ton = BTreeMap::from([(TON_ID, BigUint::from(TON_PRICE))]);
    assert_eq!(
        AccountHealth::evaluate(&user, &caches_at(LAST_UPDATE), &only_ton),
        Err(Error::MissingPrice(USDT_ID))
    );
}
