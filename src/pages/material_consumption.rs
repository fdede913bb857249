//! Material Consumption Page
//!
//! Materials used by sales over a closed period.

use leptos::prelude::*;
use leptos::task::spawn_local;

use crate::api;
use crate::calc::{format_currency, format_quantity};
use crate::context::use_app;
use crate::forms::require_range;
use crate::models::{ConsumptionReport, Ref};

use super::fields::date_input;

#[component]
pub fn MaterialConsumptionPage() -> impl IntoView {
    let ctx = use_app();
    let start = RwSignal::new(String::new());
    let end = RwSignal::new(String::new());
    let (report, set_report) = signal(None::<ConsumptionReport>);
    let (generating, set_generating) = signal(false);

    let on_submit = move |ev: web_sys::SubmitEvent| {
        ev.prevent_default();
        let (start, end) = match require_range(&start.get_untracked(), &end.get_untracked()) {
            Ok(range) => range,
            Err(err) => return ctx.toasts.error(err.to_string()),
        };
        set_generating.set(true);
        spawn_local(async move {
            let start = start.format("%Y-%m-%d").to_string();
            let end = end.format("%Y-%m-%d").to_string();
            match api::consumption_report(&ctx.api(), &start, &end).await {
                Ok(data) => {
                    set_report.set(Some(data));
                    ctx.toasts.success("Relatório gerado com sucesso!");
                }
                Err(err) => ctx.report(&err, "Erro ao gerar relatório"),
            }
            set_generating.set(false);
        });
    };

    view! {
        <div class="material-consumption-page">
            <h1>"Relatório de Consumo de Materiais"</h1>
            <p class="page-description">
                "Veja quais materiais foram utilizados nas vendas e o custo total por período"
            </p>

            <div class="report-form-container">
                <form class="report-form" on:submit=on_submit>
                    {date_input("Data Inicial *", start)}
                    {date_input("Data Final *", end)}
                    <button type="submit" class="btn-primary" disabled=move || generating.get()>
                        {move || if generating.get() { "Gerando..." } else { "Gerar Relatório" }}
                    </button>
                </form>
            </div>

            {move || report.get().map(|report| view! {
                <div class="report-results">
                    <h2>"Consumo de Materiais no Período"</h2>
                    <div class="stats-grid">
                        <div class="consumption-stat-card">
                            <h3>"Materiais Diferentes Utilizados"</h3>
                            <p class="stat-value">{report.statistics.total_materials_used}</p>
                        </div>
                        <div class="consumption-stat-card">
                            <h3>"Custo Total de Materiais"</h3>
                            <p class="stat-value">{format_currency(report.statistics.total_cost)}</p>
                        </div>
                    </div>

                    <div class="consumption-table">
                        <h3>"Detalhamento por Material"</h3>
                        <table class="data-table">
                            <thead>
                                <tr>
                                    <th>"Material"</th>
                                    <th>"Categoria"</th>
                                    <th>"Quantidade Consumida"</th>
                                    <th>"Custo Total"</th>
                                    <th>"Vendas Utilizadas"</th>
                                </tr>
                            </thead>
                            <tbody>
                                {if report.consumption.is_empty() {
                                    view! {
                                        <tr><td colspan="5" class="empty-state">"Nenhum consumo registrado no período"</td></tr>
                                    }.into_any()
                                } else {
                                    report.consumption.iter().map(|item| {
                                        let material = item.material.as_ref().and_then(Ref::populated);
                                        view! {
                                            <tr>
                                                <td><strong>{material.map_or("N/A", |m| m.name.as_str()).to_string()}</strong></td>
                                                <td>{material.map_or("-", |m| m.category.label())}</td>
                                                <td>
                                                    {format!(
                                                        "{} {}",
                                                        format_quantity(item.total_quantity),
                                                        material.map_or("", |m| m.unit.label())
                                                    )}
                                                </td>
                                                <td><strong>{format_currency(item.total_cost)}</strong></td>
                                                <td>{item.sales_count}</td>
                                            </tr>
                                        }
                                    }).collect_view().into_any()
                                }}
                            </tbody>
                        </table>
                    </div>
                </div>
            })}
        </div>
    }
}
