// demos/demo.rs
use ndarray::Axis;
use qmc_options::analytics::bs_analytic;
use qmc_options::generators::{good_lattice_points, halton};
use qmc_options::mc::greeks::{
    likelihood_delta_european_call, pathwise_delta_european_call, pathwise_rho_european_call,
    pathwise_vega_european_call,
};
use qmc_options::mc::pricing::{asian_call, european_call_estimate, lookback_call, VanillaOption};
use qmc_options::mc::spread::{GreekSet, SpreadOption};
use qmc_options::periodization::{compare_periodizations, Periodization};
use qmc_options::rng::{seed_rng_from_u64, uniform_points};

fn main() {
    println!("Running qmc-options Demo\n");

    european_section();
    path_dependent_section();
    spread_section();
    periodization_section();
}

fn european_section() {
    println!("--- European Call: MC vs QMC vs Analytic ---");

    let opt = VanillaOption {
        s0: 100.0,
        k: 100.0,
        r: 0.05,
        q: 0.02,
        sigma: 0.2,
        t: 1.0,
    };
    let analytic = bs_analytic::black_scholes_call(opt.s0, opt.k, opt.r, opt.q, opt.sigma, opt.t);

    let mut rng = seed_rng_from_u64(42);
    let mc_points = uniform_points(&mut rng, 50_000, 1);
    let mc = european_call_estimate(&opt, mc_points.index_axis(Axis(1), 0))
        .expect("Valid configuration");

    let qmc_points = halton(&[2], 50_000);
    let qmc = european_call_estimate(&opt, qmc_points.index_axis(Axis(1), 0))
        .expect("Valid configuration");

    println!("Analytic Price: {}", analytic);
    println!("MC Price:       {} (std error {})", mc.price, mc.std_error);
    println!("QMC Price:      {}", qmc.price);
    println!(
        "Relative Error: MC {:.2e}, QMC {:.2e}\n",
        (mc.price - analytic).abs() / analytic,
        (qmc.price - analytic).abs() / analytic
    );

    let points = qmc_points.index_axis(Axis(1), 0);
    let delta = pathwise_delta_european_call(&opt, points).expect("Valid configuration");
    let vega = pathwise_vega_european_call(&opt, points).expect("Valid configuration");
    let rho = pathwise_rho_european_call(&opt, points).expect("Valid configuration");
    let lr_delta = likelihood_delta_european_call(&opt, points).expect("Valid configuration");

    println!("Pathwise Delta:   {} (analytic {})", delta,
        bs_analytic::call_delta(opt.s0, opt.k, opt.r, opt.q, opt.sigma, opt.t));
    println!("Pathwise Vega:    {} (analytic {})", vega,
        bs_analytic::call_vega(opt.s0, opt.k, opt.r, opt.q, opt.sigma, opt.t));
    println!("Pathwise Rho:     {} (analytic {})", rho,
        bs_analytic::call_rho(opt.s0, opt.k, opt.r, opt.q, opt.sigma, opt.t));
    println!("Likelihood Delta: {}\n", lr_delta);
}

fn path_dependent_section() {
    println!("--- Asian and Lookback Calls (12 monitoring dates) ---");

    let opt = VanillaOption {
        s0: 100.0,
        k: 100.0,
        r: 0.05,
        q: 0.02,
        sigma: 0.2,
        t: 1.0,
    };
    let bases = [2u32, 3, 5, 7, 11, 13, 17, 19, 23, 29, 31, 37];
    let points = halton(&bases, 20_000);

    let asian = asian_call(&opt, 12, points.view()).expect("Valid configuration");
    let lookback = lookback_call(&opt, points.view()).expect("Valid configuration");

    println!("QMC Price (Asian Call):    {}", asian);
    println!("QMC Price (Lookback Call): {}\n", lookback);
}

fn spread_section() {
    println!("--- Spread Option: Importance Sampling + Analytic Greeks ---");

    let opt = SpreadOption {
        w1: 1.0,
        w2: 1.0,
        s10: 100.0,
        s20: 110.0,
        q1: 0.05,
        q2: 0.05,
        sigma1: 0.3,
        sigma2: 0.2,
        rho: 0.8,
        r: 0.05,
        k: 0.0,
        t: 1.0,
    };

    // Zero strike: the Margrabe formula is exact
    let analytic = bs_analytic::margrabe_price(
        opt.s10, opt.s20, opt.q1, opt.q2, opt.sigma1, opt.sigma2, opt.rho, opt.t,
    );

    let points = good_lattice_points(21).expect("Valid Fibonacci index");
    let greeks = opt
        .greeks(points.view(), Periodization::Identity, GreekSet::ALL)
        .expect("Valid configuration");

    println!("QMC Price:      {} ({} lattice points)", greeks.price, points.nrows());
    println!("Margrabe Price: {}", analytic);
    println!(
        "Relative Error: {:.2e}",
        (greeks.price - analytic).abs() / analytic
    );
    println!("Delta1: {}", greeks.delta1);
    println!("Delta2: {}", greeks.delta2);
    println!("Gamma1: {}", greeks.gamma1);
    println!("Gamma2: {}\n", greeks.gamma2);
}

fn periodization_section() {
    println!("--- Periodization Comparison: integral of exp(x + y) ---");

    let exact = (std::f64::consts::E - 1.0) * (std::f64::consts::E - 1.0);
    let points = good_lattice_points(16).expect("Valid Fibonacci index");
    let results = compare_periodizations(|x, y| (x + y).exp(), points.view(), &Periodization::ALL);

    println!("Exact integral: {}", exact);
    for (per, estimate) in results {
        println!(
            "{:<28} {:.12}  (error {:.2e})",
            per.name(),
            estimate,
            (estimate - exact).abs()
        );
    }
}
