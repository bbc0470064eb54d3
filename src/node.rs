use std::sync::Arc;

use neon::prelude::*;

use crate::{
    flight::format_time,
    planner::{plan, PlanOutcome},
    scenario::{ScenarioLoader, SqliteScenarioLoader},
    solver::BranchAndBoundSolver,
};

macro_rules! try_load {
    ( $cx:expr, $load_op:expr ) => {{
        let maybe = $load_op;
        match maybe {
            Err(error) => {
                let message = format!("Failed to plan scenario: {}", error);
                return $cx.throw_error(message);
            }
            Ok(value) => value,
        }
    }};
}

macro_rules! object_set {
    ( $cx:expr, $obj:expr, $key:expr, $val:expr ) => {
        let item = $val;
        // Can't mutably borrow $cx multiple times at once, hence the above statement
        $obj.set(&mut $cx, $key, item)?;
    }
}

impl Finalize for PlanOutcome {}

fn read_plan(mut cx: FunctionContext) -> JsResult<JsObject> {
    let outcome = cx.argument::<JsBox<Arc<PlanOutcome>>>(0)?;
    let selected = cx.empty_array();
    for (i, pairing) in outcome.solution.selected.iter().enumerate() {
        let obj = cx.empty_object();
        object_set!(cx, obj, "pairing_id", cx.string(&pairing.pairing_id));
        let flights = cx.empty_array();
        for (j, flight) in pairing.flights.iter().enumerate() {
            object_set!(cx, flights, j as u32, cx.string(flight));
        }
        object_set!(cx, obj, "flights", flights);
        object_set!(cx, obj, "start", cx.string(format_time(&pairing.start)));
        object_set!(cx, obj, "end", cx.string(format_time(&pairing.end)));
        object_set!(cx, obj, "duty_hours", cx.number(pairing.duty_hours));
        object_set!(cx, obj, "cost", cx.number(pairing.cost));
        object_set!(cx, selected, i as u32, obj);
    }

    let metrics = cx.empty_object();
    object_set!(cx, metrics, "total_cost", cx.number(outcome.metrics.total_cost));
    object_set!(cx, metrics, "pairings_selected", cx.number(outcome.metrics.pairings_selected as f64));
    object_set!(cx, metrics, "avg_duty_hours", cx.number(outcome.metrics.avg_duty_hours));
    object_set!(cx, metrics, "flights_covered", cx.number(outcome.metrics.flights_covered as f64));

    let obj = cx.empty_object();
    obj.set(&mut cx, "selected", selected)?;
    object_set!(cx, obj, "obj", cx.number(outcome.solution.obj));
    object_set!(cx, obj, "pairings_generated", cx.number(outcome.pairings.len() as f64));
    obj.set(&mut cx, "metrics", metrics)?;
    Ok(obj)
}

fn run_planner(mut cx: FunctionContext) -> JsResult<JsBox<Arc<PlanOutcome>>> {
    let path = cx.argument::<JsString>(0)?.value(&mut cx);
    let scenario = cx.argument::<JsString>(1)?.value(&mut cx);
    let loader = try_load!(&mut cx, SqliteScenarioLoader::new(&path, scenario));
    let flights = try_load!(&mut cx, loader.read_flights());
    let crews = try_load!(&mut cx, loader.read_crews());
    let config = try_load!(&mut cx, loader.read_config());
    let outcome = try_load!(
        &mut cx,
        plan(&flights, &crews, &config, &BranchAndBoundSolver::new())
    );
    Ok(cx.boxed(Arc::new(outcome)))
}

#[neon::main]
fn main(mut cx: ModuleContext) -> NeonResult<()> {
    cx.export_function("runPlanner", run_planner)?;
    cx.export_function("readPlan", read_plan)?;
    Ok(())
}
