//! Built-in question bank
//!
//! Deltas are small calibrated integers; the engine renormalizes after every
//! answer so only their relative size matters.

use super::types::{
    AnswerOption, Category, CategoryBank, CostRange, CriticalRule, Hypothesis, Question,
};

const CURRENCY: &str = "EUR";
const DEFAULT_BUDGET: usize = 5;

fn hypothesis(
    category: Category,
    id: &str,
    name: &str,
    weight: u32,
    safety_relevant: bool,
    cost: (u32, u32),
) -> Hypothesis {
    Hypothesis {
        id: id.to_string(),
        display_name: name.to_string(),
        category,
        base_weight: weight,
        safety_relevant,
        cost_range: CostRange::new(cost.0, cost.1, CURRENCY),
    }
}

fn opt(value: &str, label: &str, evidence: &[(&str, i32)]) -> AnswerOption {
    AnswerOption {
        value: value.to_string(),
        label: label.to_string(),
        evidence: evidence.iter().map(|(h, d)| (h.to_string(), *d)).collect(),
        critical: false,
    }
}

fn critical(value: &str, label: &str, evidence: &[(&str, i32)]) -> AnswerOption {
    AnswerOption {
        critical: true,
        ..opt(value, label, evidence)
    }
}

fn question(category: Category, id: &str, text: &str, options: Vec<AnswerOption>) -> Question {
    Question {
        id: id.to_string(),
        category,
        text: text.to_string(),
        options,
        safety_penalty: None,
    }
}

fn safety_question(
    category: Category,
    id: &str,
    text: &str,
    penalty: u8,
    options: Vec<AnswerOption>,
) -> Question {
    Question {
        safety_penalty: Some(penalty),
        ..question(category, id, text, options)
    }
}

fn rule(trigger_value: &str, clarifying_question: Question) -> CriticalRule {
    CriticalRule {
        trigger_value: trigger_value.to_string(),
        clarifying_question,
    }
}

/// All built-in banks in category order
pub fn banks() -> Vec<CategoryBank> {
    vec![engine(), brakes(), electrical(), suspension(), climate()]
}

fn engine() -> CategoryBank {
    let c = Category::Engine;
    CategoryBank {
        category: c,
        hypotheses: vec![
            hypothesis(
                c,
                "ignition_misfire",
                "Ignition misfire (spark plugs or coils)",
                25,
                false,
                (150, 400),
            ),
            hypothesis(c, "vacuum_leak", "Vacuum leak", 15, false, (80, 250)),
            hypothesis(c, "fuel_delivery", "Fuel pump or filter failure", 20, false, (250, 800)),
            hypothesis(c, "cooling_failure", "Cooling system failure", 20, true, (200, 900)),
            hypothesis(c, "timing_chain", "Worn timing chain", 20, true, (800, 2000)),
        ],
        questions: vec![
            question(c, "engine_rough_idle", "Does the engine idle roughly or shake?", vec![
                opt("yes", "Yes", &[("ignition_misfire", 20), ("vacuum_leak", 15)]),
                opt("no", "No", &[("ignition_misfire", -10), ("vacuum_leak", -5)]),
            ]),
            safety_question(
                c,
                "engine_temperature",
                "Does the temperature gauge climb above normal?",
                30,
                vec![
                    opt("yes", "Yes", &[("cooling_failure", 35), ("timing_chain", -5)]),
                    opt("no", "No", &[("cooling_failure", -15)]),
                ],
            ),
            question(c, "engine_noise", "What kind of noise does the engine make?", vec![
                opt("none", "No unusual noise", &[]),
                critical("rattle_cold", "Rattle right after a cold start", &[("timing_chain", 30)]),
                opt(
                    "ticking",
                    "Ticking that rises with RPM",
                    &[("ignition_misfire", 5), ("vacuum_leak", 5)],
                ),
                opt("hiss", "Hissing from the engine bay", &[("vacuum_leak", 25)]),
            ]),
            question(
                c,
                "engine_power_loss",
                "Does the engine lose power when accelerating uphill?",
                vec![
                    opt("yes", "Yes", &[("fuel_delivery", 25), ("ignition_misfire", 10)]),
                    opt("no", "No", &[("fuel_delivery", -10)]),
                ],
            ),
            question(
                c,
                "engine_long_crank",
                "Does the engine crank for a long time before it starts?",
                vec![
                    opt("yes", "Yes", &[("fuel_delivery", 20)]),
                    opt("no", "No", &[("fuel_delivery", -5)]),
                ],
            ),
            safety_question(
                c,
                "engine_flashing_light",
                "Is the check-engine light flashing?",
                25,
                vec![
                    opt("yes", "Yes", &[("ignition_misfire", 25)]),
                    opt("no", "No", &[]),
                ],
            ),
        ],
        critical_rules: vec![rule(
            "rattle_cold",
            question(
                c,
                "engine_rattle_duration",
                "Does the rattle last longer than a few seconds after start?",
                vec![
                    opt("yes", "Yes", &[("timing_chain", 25)]),
                    opt("no", "No", &[("timing_chain", -10), ("vacuum_leak", 5)]),
                ],
            ),
        )],
        question_budget: DEFAULT_BUDGET,
    }
}

fn brakes() -> CategoryBank {
    let c = Category::Brakes;
    CategoryBank {
        category: c,
        hypotheses: vec![
            hypothesis(c, "worn_pads", "Worn brake pads", 30, false, (120, 280)),
            hypothesis(c, "warped_rotors", "Warped brake discs", 20, false, (250, 600)),
            hypothesis(c, "sticking_caliper", "Sticking brake caliper", 15, true, (200, 500)),
            hypothesis(c, "brake_fluid_leak", "Brake fluid leak", 20, true, (150, 450)),
            hypothesis(
                c,
                "abs_sensor_fault",
                "Faulty ABS wheel-speed sensor",
                15,
                false,
                (100, 300),
            ),
        ],
        questions: vec![
            question(c, "brakes_squeal", "Do you hear a high-pitched squeal when braking?", vec![
                opt(
                    "yes",
                    "Yes",
                    &[("worn_pads", 40), ("brake_fluid_leak", -10), ("abs_sensor_fault", -5)],
                ),
                opt(
                    "no",
                    "No",
                    &[("worn_pads", -10), ("warped_rotors", 10), ("sticking_caliper", 5)],
                ),
            ]),
            question(c, "brakes_last_service", "When were the brake pads last replaced?", vec![
                opt(
                    "over_30k",
                    "More than 30,000 km ago",
                    &[("worn_pads", 35), ("warped_rotors", -5), ("sticking_caliper", -5)],
                ),
                opt(
                    "under_30k",
                    "Less than 30,000 km ago",
                    &[("worn_pads", -15), ("warped_rotors", 10)],
                ),
                opt("unknown", "I don't know", &[]),
            ]),
            question(c, "brakes_pedal_feel", "How does the brake pedal feel?", vec![
                opt("firm", "Firm, as usual", &[("brake_fluid_leak", -10)]),
                critical(
                    "spongy",
                    "Soft or spongy",
                    &[("brake_fluid_leak", 25), ("sticking_caliper", -5)],
                ),
                opt("pulsating", "Pulsating under the foot", &[("warped_rotors", 25)]),
            ]),
            safety_question(
                c,
                "brakes_burning_smell",
                "Do you notice a burning smell after driving?",
                25,
                vec![
                    opt("yes", "Yes", &[("sticking_caliper", 20), ("worn_pads", 5)]),
                    opt("no", "No", &[]),
                ],
            ),
            safety_question(
                c,
                "brakes_pull",
                "Does the car pull to one side when braking?",
                20,
                vec![
                    opt("yes", "Yes", &[("sticking_caliper", 25), ("worn_pads", 5)]),
                    opt("no", "No", &[("sticking_caliper", -10)]),
                ],
            ),
            question(c, "brakes_abs_light", "Is the ABS warning light on?", vec![
                opt("yes", "Yes", &[("abs_sensor_fault", 30)]),
                opt("no", "No", &[("abs_sensor_fault", -10)]),
            ]),
        ],
        critical_rules: vec![rule(
            "spongy",
            safety_question(
                c,
                "brakes_fluid_level",
                "Is the brake fluid below the MIN mark on the reservoir?",
                30,
                vec![
                    opt("yes", "Yes", &[("brake_fluid_leak", 25)]),
                    opt("no", "No", &[("brake_fluid_leak", -10), ("abs_sensor_fault", 5)]),
                    opt("unsure", "I can't tell", &[]),
                ],
            ),
        )],
        question_budget: DEFAULT_BUDGET,
    }
}

fn electrical() -> CategoryBank {
    let c = Category::Electrical;
    CategoryBank {
        category: c,
        hypotheses: vec![
            hypothesis(c, "weak_battery", "Weak or aged battery", 35, false, (90, 220)),
            hypothesis(c, "failing_alternator", "Failing alternator", 25, false, (250, 600)),
            hypothesis(c, "corroded_terminals", "Corroded battery terminals", 15, false, (10, 60)),
            hypothesis(c, "starter_motor", "Faulty starter motor", 15, false, (200, 500)),
            hypothesis(c, "parasitic_drain", "Parasitic battery drain", 10, false, (80, 300)),
        ],
        questions: vec![
            question(c, "elec_slow_crank", "Does the engine crank slowly?", vec![
                opt("yes", "Yes", &[("weak_battery", 20), ("corroded_terminals", 10)]),
                opt("no", "No", &[("weak_battery", -10), ("starter_motor", 5)]),
            ]),
            question(
                c,
                "elec_lights_dim",
                "Do the headlights dim while the engine is running?",
                vec![
                    opt("yes", "Yes", &[("failing_alternator", 30)]),
                    opt("no", "No", &[("failing_alternator", -10)]),
                ],
            ),
            question(
                c,
                "elec_warning_light",
                "Is the battery warning light on while driving?",
                vec![
                    opt("off", "No", &[]),
                    critical("on_steady", "Yes, steadily", &[("failing_alternator", 25)]),
                    opt(
                        "flickering",
                        "It flickers",
                        &[("corroded_terminals", 15), ("failing_alternator", 10)],
                    ),
                ],
            ),
            question(
                c,
                "elec_single_click",
                "Do you hear a single click when turning the key?",
                vec![
                    opt("yes", "Yes", &[("starter_motor", 25), ("corroded_terminals", 10)]),
                    opt("no", "No", &[("starter_motor", -10)]),
                ],
            ),
            question(
                c,
                "elec_flat_overnight",
                "Is the battery flat after standing overnight?",
                vec![
                    opt("yes", "Yes", &[("parasitic_drain", 25), ("weak_battery", 10)]),
                    opt("no", "No", &[("parasitic_drain", -5)]),
                ],
            ),
            safety_question(
                c,
                "elec_burning_plastic",
                "Do you smell burning plastic or see smoke from wiring?",
                35,
                vec![
                    opt("yes", "Yes", &[("failing_alternator", 10), ("parasitic_drain", 10)]),
                    opt("no", "No", &[]),
                ],
            ),
        ],
        critical_rules: vec![rule(
            "on_steady",
            question(
                c,
                "elec_belt_squeal",
                "Does the drive belt squeal when the engine starts?",
                vec![
                    opt("yes", "Yes", &[("failing_alternator", 15)]),
                    opt("no", "No", &[("failing_alternator", -5), ("corroded_terminals", 5)]),
                ],
            ),
        )],
        question_budget: DEFAULT_BUDGET,
    }
}

fn suspension() -> CategoryBank {
    let c = Category::Suspension;
    CategoryBank {
        category: c,
        hypotheses: vec![
            hypothesis(c, "worn_shocks", "Worn shock absorbers", 30, false, (300, 800)),
            hypothesis(c, "ball_joint", "Worn ball joint", 20, true, (150, 400)),
            hypothesis(c, "tie_rod_end", "Loose tie-rod end", 15, true, (120, 350)),
            hypothesis(c, "wheel_bearing", "Failing wheel bearing", 20, true, (200, 450)),
            hypothesis(c, "broken_coil_spring", "Broken coil spring", 15, true, (150, 400)),
        ],
        questions: vec![
            question(c, "susp_bounce", "Does the car keep bouncing after bumps?", vec![
                opt("yes", "Yes", &[("worn_shocks", 30)]),
                opt("no", "No", &[("worn_shocks", -10)]),
            ]),
            question(c, "susp_clunk", "Do you hear a clunk when driving over bumps?", vec![
                opt("yes", "Yes", &[("ball_joint", 15), ("broken_coil_spring", 15)]),
                opt("no", "No", &[("ball_joint", -5)]),
            ]),
            question(c, "susp_hum", "Is there a humming noise that rises with speed?", vec![
                opt("yes", "Yes", &[("wheel_bearing", 30)]),
                opt("no", "No", &[("wheel_bearing", -10)]),
            ]),
            safety_question(
                c,
                "susp_steering_play",
                "Does the steering feel loose or does the car wander?",
                30,
                vec![
                    opt("yes", "Yes", &[("tie_rod_end", 25), ("ball_joint", 10)]),
                    opt("no", "No", &[("tie_rod_end", -10)]),
                ],
            ),
            question(
                c,
                "susp_ride_height",
                "Does one corner of the car sit lower than the others?",
                vec![
                    opt("level", "No, it sits level", &[]),
                    critical(
                        "one_corner_low",
                        "Yes, one corner is lower",
                        &[("broken_coil_spring", 30)],
                    ),
                ],
            ),
            question(
                c,
                "susp_tyre_wear",
                "Are the tyres worn unevenly on the inner or outer edge?",
                vec![
                    opt("yes", "Yes", &[("tie_rod_end", 15), ("ball_joint", 10)]),
                    opt("no", "No", &[]),
                ],
            ),
        ],
        critical_rules: vec![rule(
            "one_corner_low",
            question(c, "susp_spring_visible", "Can you see a broken coil on the low corner?", vec![
                opt("yes", "Yes", &[("broken_coil_spring", 25)]),
                opt("no", "No", &[("broken_coil_spring", -10), ("worn_shocks", 5)]),
            ]),
        )],
        question_budget: DEFAULT_BUDGET,
    }
}

fn climate() -> CategoryBank {
    let c = Category::Climate;
    CategoryBank {
        category: c,
        hypotheses: vec![
            hypothesis(c, "low_refrigerant", "Low refrigerant charge", 35, false, (80, 200)),
            hypothesis(c, "compressor_clutch", "Failed compressor clutch", 20, false, (300, 900)),
            hypothesis(c, "clogged_cabin_filter", "Clogged cabin air filter", 20, false, (20, 60)),
            hypothesis(
                c,
                "blend_door_actuator",
                "Faulty blend door actuator",
                15,
                false,
                (100, 350),
            ),
            hypothesis(c, "heater_core_leak", "Leaking heater core", 10, true, (400, 1000)),
        ],
        questions: vec![
            question(c, "clim_warm_air", "Does the A/C blow warm air?", vec![
                opt("yes", "Yes", &[("low_refrigerant", 20), ("compressor_clutch", 10)]),
                opt("no", "No", &[("low_refrigerant", -10), ("clogged_cabin_filter", 5)]),
            ]),
            question(c, "clim_weak_flow", "Is the airflow weak even at full fan speed?", vec![
                opt("yes", "Yes", &[("clogged_cabin_filter", 30)]),
                opt("no", "No", &[("clogged_cabin_filter", -10)]),
            ]),
            question(
                c,
                "clim_compressor_click",
                "Does the compressor click on when you switch the A/C on?",
                vec![
                    opt("yes", "Yes", &[("compressor_clutch", -10), ("low_refrigerant", 10)]),
                    opt("no", "No", &[("compressor_clutch", 25)]),
                ],
            ),
            question(c, "clim_smell", "Is there a smell from the vents?", vec![
                opt("none", "No smell", &[]),
                opt("musty", "Musty", &[("clogged_cabin_filter", 15)]),
                critical("sweet", "Sweet, like syrup", &[("heater_core_leak", 35)]),
            ]),
            question(
                c,
                "clim_side_difference",
                "Does the temperature differ between the left and right vents?",
                vec![
                    opt("yes", "Yes", &[("blend_door_actuator", 30)]),
                    opt("no", "No", &[("blend_door_actuator", -5)]),
                ],
            ),
            safety_question(
                c,
                "clim_oily_fog",
                "Does the windscreen fog up with an oily film?",
                20,
                vec![
                    opt("yes", "Yes", &[("heater_core_leak", 20)]),
                    opt("no", "No", &[]),
                ],
            ),
        ],
        critical_rules: vec![rule(
            "sweet",
            question(c, "clim_damp_footwell", "Is the passenger footwell carpet damp?", vec![
                opt("yes", "Yes", &[("heater_core_leak", 25)]),
                opt("no", "No", &[("heater_core_leak", -10), ("low_refrigerant", 5)]),
            ]),
        )],
        question_budget: DEFAULT_BUDGET,
    }
}
