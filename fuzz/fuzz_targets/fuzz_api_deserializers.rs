#![no_main]

use libfuzzer_sys::fuzz_target;
use sonarqube_api::{ce::parse_task, measures::parse_component_measures};

fuzz_target!(|data: &[u8]| {
    if let Ok(body) = std::str::from_utf8(data) {
        // GET /api/ce/task bodies
        if let Ok(task) = parse_task(body) {
            let _ = task.status.is_terminal();
            let _ = task.status.to_string();
        }

        // GET /api/measures/component bodies
        if let Ok(response) = parse_component_measures(body) {
            for measure in &response.component.measures {
                let _ = measure.effective_value();
            }
            let count = response.component.measures.len();
            let record = sonarun::MetricRecord::from(response);
            assert_eq!(record.len(), count);
        }
    }
});
