//! WebAssembly host backend
//!
//! Executes precompiled wasm modules in-process. Every declared import is
//! satisfied with an inert stub so modules built against host shims (Go
//! runtime glue, env.abort, and the like) still instantiate; calls into a
//! stubbed function return zeroed results. There is no WASI and no stdout
//! capture.
//!
//! Runaway modules are stopped by fuel metering: each store gets a fuel
//! allowance proportional to its budget and traps with an out-of-fuel error
//! when it is spent.

use std::sync::OnceLock;
use std::time::Duration;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use tracing::{debug, instrument};
use wasmtime::{
    Config, Engine, ExternType, Global, HeapType, Linker, Memory, Module, Ref, Store, Table, Trap,
    Val, ValType,
};

use crate::error::RunnerError;
use crate::sniff::detect_source;
use crate::timeout::run_with_deadline;

/// Fuel units granted per second of budget. Calibrated so a tight arithmetic
/// loop burns through one second's allowance in roughly one second of CPU.
const FUEL_PER_SECOND: u64 = 33_000_000;

const BAD_MAGIC_MESSAGE: &str = "Invalid WebAssembly binary. The input must be a base64-encoded \
     .wasm file. WASM binaries start with the magic bytes '\\0asm'.";

const BAD_ENCODING_MESSAGE: &str = "Invalid WebAssembly binary format. The input must be a \
     base64-encoded .wasm file. Please compile your code to WebAssembly first, then encode the \
     binary file as base64.";

/// Shared engine for all module executions. Stores and instances are never
/// shared; each call gets its own.
fn shared_engine() -> &'static Engine {
    static ENGINE: OnceLock<Engine> = OnceLock::new();
    ENGINE.get_or_init(|| {
        let mut config = Config::new();
        config.consume_fuel(true);
        Engine::new(&config).expect("wasmtime engine")
    })
}

fn zero_val(ty: &ValType) -> Val {
    match ty {
        ValType::I32 => Val::I32(0),
        ValType::I64 => Val::I64(0),
        ValType::F32 => Val::F32(0),
        ValType::F64 => Val::F64(0),
        ValType::V128 => Val::V128(0u128.into()),
        ValType::Ref(rt) => match rt.heap_type() {
            HeapType::Extern | HeapType::NoExtern => Val::ExternRef(None),
            _ => Val::FuncRef(None),
        },
    }
}

/// Define an inert stub for every import the module declares.
fn stub_imports(
    linker: &mut Linker<()>,
    store: &mut Store<()>,
    module: &Module,
) -> Result<(), RunnerError> {
    for import in module.imports() {
        let (module_name, field) = (import.module(), import.name());
        match import.ty() {
            ExternType::Func(func_ty) => {
                let results: Vec<ValType> = func_ty.results().collect();
                linker
                    .func_new(module_name, field, func_ty.clone(), move |_caller, _params, out| {
                        for (slot, ty) in out.iter_mut().zip(results.iter()) {
                            *slot = zero_val(ty);
                        }
                        Ok(())
                    })
                    .map_err(|e| RunnerError::RuntimeFault(e.to_string()))?;
            }
            ExternType::Memory(mem_ty) => {
                let memory = Memory::new(&mut *store, mem_ty)
                    .map_err(|e| RunnerError::RuntimeFault(e.to_string()))?;
                linker
                    .define(&mut *store, module_name, field, memory)
                    .map_err(|e| RunnerError::RuntimeFault(e.to_string()))?;
            }
            ExternType::Global(global_ty) => {
                let init = zero_val(global_ty.content());
                let global = Global::new(&mut *store, global_ty, init)
                    .map_err(|e| RunnerError::RuntimeFault(e.to_string()))?;
                linker
                    .define(&mut *store, module_name, field, global)
                    .map_err(|e| RunnerError::RuntimeFault(e.to_string()))?;
            }
            ExternType::Table(table_ty) => {
                let init = match table_ty.element().heap_type() {
                    HeapType::Extern | HeapType::NoExtern => Ref::Extern(None),
                    _ => Ref::Func(None),
                };
                let table = Table::new(&mut *store, table_ty, init)
                    .map_err(|e| RunnerError::RuntimeFault(e.to_string()))?;
                linker
                    .define(&mut *store, module_name, field, table)
                    .map_err(|e| RunnerError::RuntimeFault(e.to_string()))?;
            }
        }
    }
    Ok(())
}

fn map_trap(err: wasmtime::Error) -> RunnerError {
    if matches!(err.downcast_ref::<Trap>(), Some(Trap::OutOfFuel)) {
        RunnerError::Timeout
    } else {
        RunnerError::RuntimeFault(err.to_string())
    }
}

fn format_return(results: &[Val]) -> String {
    match results {
        [] => "undefined".to_owned(),
        [val] => format_val(val),
        many => {
            let parts: Vec<String> = many.iter().map(format_val).collect();
            parts.join(",")
        }
    }
}

fn format_val(val: &Val) -> String {
    match val {
        Val::I32(v) => v.to_string(),
        Val::I64(v) => v.to_string(),
        Val::F32(bits) => f32::from_bits(*bits).to_string(),
        Val::F64(bits) => f64::from_bits(*bits).to_string(),
        other => format!("{other:?}"),
    }
}

fn execute_blocking(binary: &[u8], budget: Duration) -> Result<String, RunnerError> {
    let engine = shared_engine();
    let module = Module::new(engine, binary)
        .map_err(|e| RunnerError::MalformedInput(e.to_string()))?;

    let mut store = Store::new(engine, ());
    let fuel = (budget.as_secs_f64() * FUEL_PER_SECOND as f64) as u64;
    store
        .set_fuel(fuel.max(1))
        .map_err(|e| RunnerError::RuntimeFault(e.to_string()))?;

    let mut linker = Linker::new(engine);
    stub_imports(&mut linker, &mut store, &module)?;

    let instance = linker
        .instantiate(&mut store, &module)
        .map_err(map_trap)?;

    if let Some(start) = instance.get_func(&mut store, "_start") {
        start.call(&mut store, &[], &mut []).map_err(map_trap)?;
        return Ok("_start executed (no stdout capture)".to_owned());
    }

    if let Some(main) = instance.get_func(&mut store, "main") {
        let ty = main.ty(&store);
        let params: Vec<Val> = ty.params().map(|p| zero_val(&p)).collect();
        let mut results: Vec<Val> = ty.results().map(|r| zero_val(&r)).collect();
        main.call(&mut store, &params, &mut results).map_err(map_trap)?;
        return Ok(format!("main executed, return={}", format_return(&results)));
    }

    Err(RunnerError::UnsupportedFeature(
        "WASM has no _start or main export".to_owned(),
    ))
}

/// Execute raw module bytes with the given budget.
#[instrument(skip(binary), fields(len = binary.len()))]
pub async fn execute_module(binary: &[u8], budget: Duration) -> Result<String, RunnerError> {
    if binary.len() < 4 || &binary[..4] != b"\0asm" {
        return Err(RunnerError::MalformedInput(BAD_MAGIC_MESSAGE.to_owned()));
    }
    debug!("instantiating wasm module");

    let binary = binary.to_vec();
    run_with_deadline(budget, async move {
        tokio::task::spawn_blocking(move || execute_blocking(&binary, budget))
            .await
            .map_err(|e| RunnerError::RuntimeFault(e.to_string()))?
    })
    .await
}

/// Decode a base64 payload and execute it as a module.
///
/// Payloads that look like source code in a compiled language are rejected
/// with a hint naming the toolchain that produces wasm for that language.
pub async fn execute_base64(payload: &str, budget: Duration) -> Result<String, RunnerError> {
    if let Some(language) = detect_source(payload) {
        return Err(RunnerError::UnsupportedFeature(format!(
            "{} source code is not supported directly. Please compile your code to WebAssembly \
             (.wasm) first, then provide the binary as a base64-encoded string. {}",
            language.name(),
            language.wasm_toolchain_hint()
        )));
    }

    let binary = BASE64
        .decode(payload.trim())
        .map_err(|_| RunnerError::MalformedInput(BAD_ENCODING_MESSAGE.to_owned()))?;
    execute_module(&binary, budget).await
}
