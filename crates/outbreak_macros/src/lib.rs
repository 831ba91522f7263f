use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::{quote, ToTokens};
use syn::{parse_macro_input, FnArg, ItemFn, LitInt, Pat, Signature};

/// Default slow-call threshold in microseconds.
const DEFAULT_THRESHOLD_US: u128 = 1_000;

/// Ticks between unconditional timing reports for tick-aware functions.
const REPORT_EVERY_TICKS: u64 = 100;

/// Time a function when the `perf_stats` feature is enabled.
///
/// The body is wrapped with a guard that logs the elapsed time through
/// Bevy's `info!` when the function returns. Without `perf_stats` the
/// guard is compiled out and the function is unchanged.
///
/// A call is reported when it takes longer than the threshold (microseconds,
/// default 1000). Functions with a `tick: Res<SimTick>` parameter are also
/// reported every 100 ticks regardless of duration.
///
/// ```ignore
/// #[profile]
/// pub fn advance_outbreak(mut outbreak: ResMut<Outbreak>, tick: Res<SimTick>) {
///     outbreak.tick();
/// }
///
/// #[profile(250)]
/// pub fn expensive_helper() { /* ... */ }
/// ```
#[proc_macro_attribute]
pub fn profile(attr: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as ItemFn);

    let threshold_us: u128 = if attr.is_empty() {
        DEFAULT_THRESHOLD_US
    } else {
        match syn::parse::<LitInt>(attr) {
            Ok(lit) => lit.base10_parse().unwrap_or(DEFAULT_THRESHOLD_US),
            Err(err) => return err.to_compile_error().into(),
        }
    };

    let ItemFn { attrs, vis, sig, block } = input;
    let guard = profile_guard(&sig, threshold_us);

    let output = quote! {
        #(#attrs)*
        #vis #sig {
            #[cfg(feature = "perf_stats")]
            let _profile_guard = { #guard };

            #block
        }
    };

    output.into()
}

/// Whether the signature takes `tick` typed as something mentioning `SimTick`.
fn has_tick_param(sig: &Signature) -> bool {
    sig.inputs.iter().any(|arg| {
        let FnArg::Typed(pat_type) = arg else {
            return false;
        };
        let Pat::Ident(pat_ident) = &*pat_type.pat else {
            return false;
        };
        pat_ident.ident == "tick" && pat_type.ty.to_token_stream().to_string().contains("SimTick")
    })
}

fn profile_guard(sig: &Signature, threshold_us: u128) -> TokenStream2 {
    let name = sig.ident.to_string();
    let tick_value = if has_tick_param(sig) {
        quote! { Some(tick.0) }
    } else {
        quote! { None }
    };

    quote! {
        struct ProfileGuard {
            name: &'static str,
            start: std::time::Instant,
            tick: Option<u64>,
        }

        impl Drop for ProfileGuard {
            fn drop(&mut self) {
                let elapsed = self.start.elapsed();
                let slow = elapsed.as_micros() > #threshold_us;
                let periodic = self.tick.is_some_and(|t| t % #REPORT_EVERY_TICKS == 0);
                if slow || periodic {
                    match self.tick {
                        Some(t) => bevy::prelude::info!("[PERF] {} (tick {}): {:?}", self.name, t, elapsed),
                        None => bevy::prelude::info!("[PERF] {}: {:?}", self.name, elapsed),
                    }
                }
            }
        }

        ProfileGuard {
            name: #name,
            start: std::time::Instant::now(),
            tick: #tick_value,
        }
    }
}
