//! PyO3 bindings for Python integration

use pyo3::prelude::*;

mod filter_bindings;
mod search_bindings;

/// Python module definition
#[pymodule]
fn excess_power(_py: Python, m: &PyModule) -> PyResult<()> {
    m.add_class::<filter_bindings::PyWindowType>()?;
    m.add_class::<search_bindings::PyBurstEvent>()?;

    m.add_function(wrap_pyfunction!(filter_bindings::window, m)?)?;
    m.add_function(wrap_pyfunction!(search_bindings::condition_data, m)?)?;
    m.add_function(wrap_pyfunction!(search_bindings::ep_search, m)?)?;

    Ok(())
}
