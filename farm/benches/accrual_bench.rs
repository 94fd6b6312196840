use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use dao_farm::{Farm, RewardSchedule, TokenMinter};
use dao_types::{AccountId, AssetId, Timestamp, ONE_TOKEN, SECS_PER_DAY};

const PERIOD_SECS: u64 = 365 * SECS_PER_DAY;

fn account(n: u64) -> AccountId {
    AccountId::new(format!("0x{:040x}", n))
}

fn asset() -> AssetId {
    AssetId::new(format!("0x{:040x}", 0xa001))
}

fn make_schedule(periods: usize) -> RewardSchedule {
    RewardSchedule::halving(
        Timestamp::new(0),
        PERIOD_SECS,
        periods,
        500_000 * ONE_TOKEN,
        1_000_000 * ONE_TOKEN,
    )
    .unwrap()
}

/// A farm with `stakers` accounts, each staking one day apart.
fn make_farm(stakers: u64) -> Farm<TokenMinter> {
    let minter = TokenMinter::new("DAO", 1_000_000 * ONE_TOKEN, account(u64::MAX)).unwrap();
    let mut farm = Farm::new(minter);
    farm.add_asset(asset(), Timestamp::new(0)).unwrap();
    farm.add_reward_periods(make_schedule(10), Timestamp::new(0))
        .unwrap();
    for n in 1..=stakers {
        farm.deposit_and_start_stake(&account(n), &asset(), 10 * ONE_TOKEN, Timestamp::new(n * SECS_PER_DAY))
            .unwrap();
    }
    farm
}

fn bench_emission_curve(c: &mut Criterion) {
    let mut group = c.benchmark_group("emission_curve");

    for periods in [1, 10, 100] {
        let schedule = make_schedule(periods);
        let from = Timestamp::new(PERIOD_SECS / 3);
        let to = schedule.end().plus_days(1);

        group.bench_with_input(
            BenchmarkId::new("emitted_between", periods),
            &periods,
            |b, _| {
                b.iter(|| black_box(schedule.emitted_between(black_box(from), black_box(to))));
            },
        );
    }

    group.finish();
}

fn bench_claimable_reward(c: &mut Criterion) {
    let mut group = c.benchmark_group("claimable_reward");

    for stakers in [1, 100, 1000] {
        let farm = make_farm(stakers);
        let now = Timestamp::new(5 * PERIOD_SECS);
        let who = account(1);

        group.bench_with_input(BenchmarkId::new("projection", stakers), &stakers, |b, _| {
            b.iter(|| black_box(farm.claimable_reward(black_box(&who), black_box(now))));
        });
    }

    group.finish();
}

fn bench_stake_cycle(c: &mut Criterion) {
    c.bench_function("stake_and_claim", |b| {
        b.iter_batched(
            || make_farm(100),
            |mut farm| {
                let who = account(1);
                let now = Timestamp::new(2 * PERIOD_SECS);
                farm.deposit_and_start_stake(&who, &asset(), ONE_TOKEN, now).unwrap();
                black_box(farm.claim_reward(&who, now).unwrap())
            },
            criterion::BatchSize::SmallInput,
        );
    });
}

criterion_group!(
    benches,
    bench_emission_curve,
    bench_claimable_reward,
    bench_stake_cycle
);
criterion_main!(benches);
