use betsmart::analytics::{clv_edge, EquityCurve, PerformanceReport};
use betsmart::domain::{round2, BetStatus, Currency, ExchangeContext, NewBet, Segment};
use betsmart::error::LedgerError;
use betsmart::ledger::{BankrollState, Ledger};
use betsmart::strategy::{KellyCalculator, RiskProfile, StakeRequest};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn bet(stake: Decimal, odds: Decimal) -> NewBet {
    NewBet::new("Home vs Away", "Home", stake, odds)
}

/// Rounding twice never moves a value further.
#[test]
fn round2_is_idempotent() {
    let samples = [
        dec!(0),
        dec!(0.005),
        dec!(-0.005),
        dec!(1.234999),
        dec!(2.675),
        dec!(-37000.125),
        dec!(10) / dec!(3),
    ];
    for x in samples {
        assert_eq!(round2(round2(x)), round2(x), "x = {x}");
    }
    assert_eq!(round2(dec!(2.675)), dec!(2.68));
    assert_eq!(round2(dec!(-2.675)), dec!(-2.68));
}

/// Current capital always equals base plus realized profit, whatever order
/// bets are appended and settled in.
#[test]
fn current_capital_is_base_plus_realized_profit() {
    let orders: [&[usize]; 3] = [&[0, 1, 2, 3], &[3, 2, 1, 0], &[2, 0, 3, 1]];
    let outcomes = [
        BetStatus::Won,
        BetStatus::Lost,
        BetStatus::Won,
        BetStatus::Lost,
    ];
    let stakes = [dec!(10.10), dec!(25), dec!(3.33), dec!(100)];
    let odds = [dec!(1.91), dec!(2.5), dec!(3.05), dec!(1.5)];

    let mut capitals = Vec::new();
    for order in orders {
        let mut ledger = Ledger::new();
        let bankroll = BankrollState::new(dec!(1000));
        let ids: Vec<_> = (0..4)
            .map(|i| ledger.append(bet(stakes[i], odds[i])).unwrap())
            .collect();

        for &i in order {
            ledger.resolve(ids[i], outcomes[i]).unwrap();
            assert_eq!(
                bankroll.current_capital(&ledger),
                round2(bankroll.base_capital() + ledger.realized_profit())
            );
        }
        capitals.push(bankroll.current_capital(&ledger));
    }

    assert!(capitals.windows(2).all(|w| w[0] == w[1]));
    // 10.10 * 0.91 - 25 + 3.33 * 2.05 - 100
    assert_eq!(capitals[0], dec!(891.02));
}

/// A resolved bet cannot be resolved again and keeps its first outcome.
#[test]
fn resolution_is_final() {
    let mut ledger = Ledger::new();
    let id = ledger.append(bet(dec!(50), dec!(2.2))).unwrap();
    ledger.resolve(id, BetStatus::Won).unwrap();

    let err = ledger.resolve(id, BetStatus::Lost).unwrap_err();
    assert!(matches!(err, LedgerError::InvalidTransition { .. }));
    assert_eq!(ledger.get(id).unwrap().status, BetStatus::Won);
}

/// Editing the total keeps realized profit on the books.
#[test]
fn bankroll_edit_back_solves_base_capital() {
    let mut ledger = Ledger::new();
    let mut bankroll = BankrollState::new(dec!(1000));
    let won = ledger.append(bet(dec!(100), dec!(2.0))).unwrap();
    let lost = ledger.append(bet(dec!(50), dec!(1.8))).unwrap();
    ledger.resolve(won, BetStatus::Won).unwrap();
    ledger.resolve(lost, BetStatus::Lost).unwrap();
    assert_eq!(ledger.realized_profit(), dec!(50));

    let new_base = bankroll.rebase_to_total(dec!(2000), &ledger);
    assert_eq!(new_base, dec!(1950));
    assert_eq!(bankroll.current_capital(&ledger), dec!(2000));
}

/// Two soccer bets, one won and one lost at even money, break even.
#[test]
fn segment_aggregation_scenario() {
    let mut ledger = Ledger::new();
    for status in [BetStatus::Won, BetStatus::Lost] {
        let id = ledger
            .append(bet(dec!(100), dec!(2.0)).with_segment("SOCCER"))
            .unwrap();
        ledger.resolve(id, status).unwrap();
    }
    // Pending and void bets never count
    ledger.append(bet(dec!(100), dec!(2.0)).with_segment("SOCCER")).unwrap();
    let void = ledger.append(bet(dec!(100), dec!(2.0)).with_segment("SOCCER")).unwrap();
    ledger.void(void).unwrap();

    let report = PerformanceReport::from_ledger(&ledger);
    let soccer = report.segment(&Segment::Soccer).unwrap();
    assert_eq!(soccer.total_bets, 2);
    assert_eq!(soccer.won, 1);
    assert_eq!(soccer.invested, dec!(200));
    assert_eq!(soccer.returned, dec!(200));
    assert_eq!(soccer.profit(), dec!(0));
    assert_eq!(soccer.roi(), dec!(0));
    assert_eq!(soccer.win_rate(), dec!(50));
}

/// COP display converts 10 USD to 37,000 and back.
#[test]
fn exchange_rate_boundary() {
    let cop = ExchangeContext::new(Currency::Cop, dec!(3700)).unwrap();
    assert_eq!(cop.to_display(dec!(10)), dec!(37000.00));
    assert_eq!(cop.to_internal(dec!(37000)), dec!(10.00));

    let mut ctx = cop.clone();
    assert!(!ctx.set_rate_from_input("0"));
    assert!(!ctx.set_rate_from_input("abc"));
    assert_eq!(ctx.rate(), dec!(3700));
}

/// Stake never decreases as the win probability rises, and the safety
/// margin never increases it.
#[test]
fn kelly_monotone_and_margin_bounded() {
    for profile in [
        RiskProfile::Conservative,
        RiskProfile::Balanced,
        RiskProfile::Aggressive,
    ] {
        let with_margin = KellyCalculator::new(profile);
        let without_margin = KellyCalculator::new(profile).with_safety_margin(false);

        let mut previous = Decimal::ZERO;
        for pct in (0..=100).step_by(5) {
            let pct = Decimal::from(pct);
            let stake = with_margin.calculate(dec!(1000), dec!(2.1), pct).stake;
            let raw = without_margin.calculate(dec!(1000), dec!(2.1), pct).stake;
            assert!(stake >= Decimal::ZERO);
            assert!(stake >= previous, "{profile} at {pct}%");
            assert!(stake <= raw, "{profile} at {pct}%");
            previous = stake;
        }
    }
}

/// Unparsable inputs degrade to a zero stake.
#[test]
fn kelly_bad_inputs_give_zero() {
    let calc = KellyCalculator::default();
    for (bankroll, odds, pct) in [("abc", "2.0", "60"), ("1000", "", "60"), ("1000", "1.0", "60")] {
        let rec = calc.recommend(&StakeRequest::from_inputs(bankroll, odds, pct));
        assert_eq!(rec.stake, Decimal::ZERO);
    }
}

/// The curve replays settled bets by id and starts at the initial bankroll.
#[test]
fn equity_curve_replays_by_id() {
    let mut ledger = Ledger::new();
    let first = ledger.append(bet(dec!(100), dec!(2.0)).with_date("2024-06-02")).unwrap();
    let second = ledger.append(bet(dec!(50), dec!(3.0)).with_date("2024-06-01")).unwrap();
    ledger.append(bet(dec!(20), dec!(2.0))).unwrap();
    ledger.resolve(second, BetStatus::Lost).unwrap();
    ledger.resolve(first, BetStatus::Won).unwrap();

    let curve = EquityCurve::build(ledger.records(), dec!(500), Decimal::ONE);
    let values: Vec<_> = curve.points().iter().map(|p| p.value).collect();
    assert_eq!(values, vec![dec!(500), dec!(600), dec!(550)]);
    assert_eq!(curve.max_drawdown(), dec!(50));
}

/// Taking 2.00 when the market closes at 1.80 beats the close by 11.11%.
#[test]
fn clv_sign_semantics() {
    let edge = clv_edge(dec!(2.00), dec!(1.80)).unwrap();
    assert_eq!(round2(edge), dec!(11.11));
    assert!(clv_edge(dec!(1.80), dec!(2.00)).unwrap() < Decimal::ZERO);
}
