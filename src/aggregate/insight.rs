//! Insight sentences for each view.
//!
//! Every figure quoted here is read straight from the [`Computed`] summary
//! the chart is drawn from, so the text and the chart always agree.

use super::share::OTHER_LABEL;
use super::table::Computed;

/// Index of the first maximum.
fn first_max(values: &[f64]) -> Option<usize> {
    values
        .iter()
        .enumerate()
        .fold(None, |best: Option<(usize, f64)>, (i, &v)| match best {
            Some((_, b)) if v <= b => best,
            _ => Some((i, v)),
        })
        .map(|(i, _)| i)
}

fn percent_of(part: f64, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part / whole as f64 * 100.0
    }
}

pub fn top_makes_by_city(c: &Computed) -> Vec<String> {
    let (Some(city), Some(&city_total), Some(lead)) =
        (c.labels.first(), c.counts.first(), c.series.first())
    else {
        return Vec::new();
    };
    let n_cities = c.labels.len();
    let lead_total: f64 = lead.values.iter().sum();

    let mut out = vec![
        format!(
            "{city} has the most registrations of any city, with {city_total} vehicles; \
             its leading make is {}.",
            lead.name
        ),
        format!(
            "Across the top {n_cities} cities, {} accounts for {lead_total} vehicles.",
            lead.name
        ),
    ];
    if let Some(second) = c.series.get(1) {
        let second_total: f64 = second.values.iter().sum();
        out.push(format!(
            "{} follows with {second_total} vehicles in the same cities.",
            second.name
        ));
    }
    let all_cities: usize = c.counts.iter().sum();
    let shown: f64 = c.series.iter().flat_map(|s| s.values.iter()).sum();
    let remaining = all_cities as f64 - shown;
    if remaining > 0.0 {
        out.push(format!(
            "The remaining {remaining} vehicles in these cities belong to other makes."
        ));
    }
    out
}

pub fn ev_type_distribution(c: &Computed) -> Vec<String> {
    let v = c.values();
    let Some(first) = c.labels.first() else {
        return Vec::new();
    };
    let mut out = vec![format!(
        "The most common EV type is {first}, accounting for {:.2}% of vehicles.",
        v[0]
    )];
    match c.labels.get(1) {
        None => out.push("No other EV type is registered.".to_string()),
        // Types beyond the requested top N were folded into one slice.
        Some(second) if second == OTHER_LABEL => out.push(format!(
            "The remaining EV types together account for {:.2}%.",
            v[1]
        )),
        Some(second) => {
            out.push(format!(
                "The second most common EV type is {second}, at {:.2}%.",
                v[1]
            ));
            if c.labels.len() > 2 {
                out.push(format!(
                    "The remaining EV types together account for {:.2}%.",
                    100.0 - (v[0] + v[1])
                ));
            }
        }
    }
    out
}

pub fn avg_range_by_make(c: &Computed) -> Vec<String> {
    let v = c.values();
    let Some(first) = c.labels.first() else {
        return Vec::new();
    };
    let mut out = vec![format!(
        "{first} has the highest average electric range, at {:.2} miles.",
        v[0]
    )];
    if let Some(second) = c.labels.get(1) {
        out.push(format!(
            "{second} is second, with an average range of {:.2} miles.",
            v[1]
        ));
        out.push(format!(
            "The top two averages add up to {:.2} miles.",
            v[0] + v[1]
        ));
    }
    if v.len() > 2 {
        let rest: f64 = v[2..].iter().sum();
        out.push(format!(
            "The other {} makes shown have a combined average range of {rest:.2} miles.",
            v.len() - 2
        ));
    }
    if c.labels.len() == 1 {
        out.push("No other make reports an electric range.".to_string());
    }
    out
}

pub fn base_msrp_over_years(c: &Computed) -> Vec<String> {
    let v = c.values();
    let (Some(first_year), Some(last_year)) = (c.labels.first(), c.labels.last()) else {
        return Vec::new();
    };
    let first = v[0];
    let mut out = vec![format!(
        "In {first_year}, the average base MSRP was ${first:.2}."
    )];
    if v.len() > 1 {
        let last = v[v.len() - 1];
        let change = last - first;
        let mut sentence = format!(
            "By {last_year}, the average base MSRP was ${last:.2}, a change of ${change:.2}"
        );
        if first != 0.0 {
            sentence.push_str(&format!(" ({:.2}%)", change / first * 100.0));
        }
        sentence.push('.');
        out.push(sentence);
    }
    if let Some(i) = first_max(v) {
        out.push(format!(
            "The highest average base MSRP was ${:.2}, for model year {}.",
            v[i], c.labels[i]
        ));
    }
    out
}

pub fn range_distribution(c: &Computed) -> Vec<String> {
    let Some(i) = first_max(c.values()) else {
        return Vec::new();
    };
    let count = c.counts[i];
    vec![
        format!("{} vehicles report an electric range.", c.qualifying),
        format!(
            "The most common range band is {} miles, with {count} vehicles ({:.2}% of them).",
            c.labels[i],
            percent_of(count as f64, c.qualifying)
        ),
    ]
}

pub fn ev_adoption(c: &Computed) -> Vec<String> {
    let Some(peak) = first_max(c.values()) else {
        return Vec::new();
    };
    let mut out = vec![
        format!("{} registrations have a model year.", c.qualifying),
        format!(
            "The peak model year is {}, with {} registrations.",
            c.labels[peak], c.counts[peak]
        ),
    ];
    let last = c.labels.len() - 1;
    if last != peak {
        out.push(format!(
            "The most recent model year, {}, has {} registrations.",
            c.labels[last], c.counts[last]
        ));
    }
    out
}

pub fn most_common_models(c: &Computed) -> Vec<String> {
    let Some(first) = c.labels.first() else {
        return Vec::new();
    };
    let mut out = vec![format!(
        "The most common model is {first}, with {} vehicles, {:.2}% of all {} registrations.",
        c.counts[0],
        percent_of(c.counts[0] as f64, c.records),
        c.records
    )];
    if let Some(second) = c.labels.get(1) {
        out.push(format!(
            "The second most common model, {second}, has {} vehicles.",
            c.counts[1]
        ));
    }
    let n = c.labels.len();
    if n > 2 {
        out.push(format!(
            "Number {n} on the list, {}, has {} vehicles.",
            c.labels[n - 1],
            c.counts[n - 1]
        ));
    }
    let shown: usize = c.counts.iter().sum();
    out.push(format!(
        "Together the top {n} models account for {:.2}% of all registrations.",
        percent_of(shown as f64, c.records)
    ));
    out
}

pub fn cafv_eligibility(c: &Computed) -> Vec<String> {
    let (Some(&eligible), Some(&other)) = (c.counts.first(), c.counts.get(1)) else {
        return Vec::new();
    };
    vec![
        format!(
            "{eligible} vehicles are eligible for CAFV status, {:.1}% of those with a \
             reported eligibility.",
            percent_of(eligible as f64, c.qualifying)
        ),
        format!(
            "The remaining {other} vehicles ({:.1}%) are not eligible or have not been \
             evaluated.",
            percent_of(other as f64, c.qualifying)
        ),
    ]
}

pub fn ev_market_share(c: &Computed) -> Vec<String> {
    let v = c.values();
    let Some(first) = c.labels.first() else {
        return Vec::new();
    };
    let mut out = vec![format!(
        "{first} holds the largest market share, at {:.2}%.",
        v[0]
    )];
    match c.labels.get(1) {
        None => out.push("No other make is registered.".to_string()),
        Some(second) if second == OTHER_LABEL => out.push(format!(
            "All other makes together hold {:.2}%.",
            v[1]
        )),
        Some(second) => {
            out.push(format!("{second} is second, with {:.2}%.", v[1]));
            if c.labels.len() > 2 {
                out.push(format!(
                    "All other makes together hold {:.2}%.",
                    100.0 - (v[0] + v[1])
                ));
            }
        }
    }
    out
}
