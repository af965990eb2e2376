//! Tailoring orders: a client, one or more garments with measurements, and
//! a status history that records every change.

use crate::{
    entities::{
        client::{self, Entity as Client},
        custom_order::{self, CustomOrderStatus, Entity as CustomOrder},
        custom_order_history::{self, Entity as CustomOrderHistory},
        custom_order_item::{self, Entity as CustomOrderItem, GarmentType},
        notification::NotificationKind,
    },
    errors::ServiceError,
    events::{Event, EventSender},
    metrics::CUSTOM_ORDER_MUTATIONS,
    services::{
        measurements::{self, Measurements},
        notifications,
        order_code::{self, CodeRegistry},
        page_window, Actor, Page,
    },
};
use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, DatabaseConnection,
    DatabaseTransaction, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};
use serde::{Deserialize, Deserializer, Serialize};
use std::{collections::BTreeMap, str::FromStr, sync::Arc};
use tracing::{error, info, instrument, warn};
use utoipa::ToSchema;
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct GarmentItemInput {
    /// One of `pollera`, `blusa`, `manta`, `chaqueta`, `vestido`, `pantalon`.
    #[validate(length(min = 1, max = 16))]
    pub garment_type: String,
    /// Keys outside the garment's measurement list are dropped.
    #[serde(default)]
    pub measurements: BTreeMap<String, String>,
    #[validate(length(max = 1000))]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct NewCustomOrder {
    #[validate(length(min = 1, max = 100))]
    pub client_name: String,
    #[validate(length(min = 5, max = 20))]
    pub client_phone: String,
    pub delivery_date: Option<NaiveDate>,
    pub deposit: Option<Decimal>,
    pub total: Option<Decimal>,
    #[serde(default)]
    pub is_urgent: bool,
    #[validate(length(max = 2000))]
    pub notes: Option<String>,
    pub items: Vec<GarmentItemInput>,
}

/// Partial update of the order's own fields.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdateCustomOrder {
    /// Absent leaves the date alone; `null` clears it.
    #[serde(
        default,
        deserialize_with = "present_or_null",
        skip_serializing_if = "Option::is_none"
    )]
    #[schema(value_type = Option<String>, format = Date)]
    pub delivery_date: Option<Option<NaiveDate>>,
    pub deposit: Option<Decimal>,
    pub total: Option<Decimal>,
    pub is_urgent: Option<bool>,
    #[validate(length(max = 2000))]
    pub notes: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub client_name: Option<String>,
}

/// Distinguishes a field sent as `null` (`Some(None)`) from one left out
/// (`None`, through `#[serde(default)]`).
fn present_or_null<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

#[derive(Debug, Clone, Default)]
pub struct CustomOrderFilter {
    pub status: Option<CustomOrderStatus>,
    pub urgent_only: bool,
    /// Matches the order code or the client's name.
    pub search: Option<String>,
}

#[derive(Debug, Clone)]
pub struct CustomOrderDetail {
    pub order: custom_order::Model,
    pub client: Option<client::Model>,
    pub items: Vec<custom_order_item::Model>,
    pub history: Vec<custom_order_history::Model>,
}

impl CustomOrderDetail {
    /// Garment shown in listings: the first item.
    pub fn garment_summary(&self) -> Option<(GarmentType, Measurements)> {
        self.items
            .first()
            .map(|item| (item.garment_type, measurements::from_json(&item.measurements)))
    }
}

pub fn parse_garment(raw: &str) -> Result<GarmentType, ServiceError> {
    GarmentType::from_str(raw.trim().to_lowercase().as_str())
        .map_err(|_| ServiceError::ValidationError(format!("Unknown garment type: {}", raw)))
}

pub fn parse_status(raw: &str) -> Result<CustomOrderStatus, ServiceError> {
    let status = CustomOrderStatus::from_str(raw.trim())
        .map_err(|_| ServiceError::InvalidStatus(format!("Unknown custom order status: {}", raw)))?;
    if !status.is_assignable() {
        return Err(ServiceError::InvalidStatus(format!(
            "Status '{}' can no longer be assigned",
            status
        )));
    }
    Ok(status)
}

fn non_negative(label: &str, value: Option<Decimal>) -> Result<(), ServiceError> {
    match value {
        Some(v) if v.is_sign_negative() => Err(ServiceError::ValidationError(format!(
            "{} cannot be negative",
            label
        ))),
        _ => Ok(()),
    }
}

/// A validated item ready to be written.
struct PreparedItem {
    garment: GarmentType,
    measurements: Measurements,
    notes: Option<String>,
}

fn prepare_item(input: &GarmentItemInput) -> Result<PreparedItem, ServiceError> {
    input.validate()?;
    let garment = parse_garment(&input.garment_type)?;
    Ok(PreparedItem {
        garment,
        measurements: measurements::filter_for_garment(garment, &input.measurements),
        notes: input
            .notes
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .map(str::to_string),
    })
}

struct CustomCodes<'a, C>(&'a C);

#[async_trait]
impl<C: ConnectionTrait> CodeRegistry for CustomCodes<'_, C> {
    async fn is_taken(&self, code: &str) -> Result<bool, ServiceError> {
        let count = CustomOrder::find()
            .filter(custom_order::Column::Code.eq(code))
            .count(self.0)
            .await?;
        Ok(count > 0)
    }
}

#[derive(Clone)]
pub struct CustomOrderService {
    db: Arc<DatabaseConnection>,
    event_sender: Option<Arc<EventSender>>,
}

impl CustomOrderService {
    pub fn new(db: Arc<DatabaseConnection>, event_sender: Option<Arc<EventSender>>) -> Self {
        Self { db, event_sender }
    }

    /// Creates the order, its items, and the first history entry. The client
    /// is found by phone or created.
    #[instrument(skip(self, input, actor), fields(client_phone = %input.client_phone, items = input.items.len()))]
    pub async fn create(
        &self,
        input: NewCustomOrder,
        actor: &Actor,
    ) -> Result<CustomOrderDetail, ServiceError> {
        input.validate()?;
        if input.items.is_empty() {
            return Err(ServiceError::ValidationError(
                "A custom order needs at least one garment".to_string(),
            ));
        }
        non_negative("deposit", input.deposit)?;
        non_negative("total", input.total)?;
        let prepared = input
            .items
            .iter()
            .map(prepare_item)
            .collect::<Result<Vec<_>, _>>()?;

        let txn = self.db.begin().await.map_err(|e| {
            error!(error = %e, "Failed to start transaction for custom order");
            ServiceError::DatabaseError(e)
        })?;

        let client = find_or_create_client(&txn, &input.client_name, &input.client_phone).await?;
        let code =
            order_code::generate_unique_code(order_code::CUSTOM_PREFIX, &CustomCodes(&txn)).await?;
        let now = Utc::now();

        let order = custom_order::ActiveModel {
            code: Set(code.clone()),
            client_id: Set(client.id),
            status: Set(CustomOrderStatus::Pending),
            delivery_date: Set(input.delivery_date),
            deposit: Set(input.deposit.unwrap_or_default().round_dp(2)),
            total: Set(input.total.unwrap_or_default().round_dp(2)),
            is_urgent: Set(input.is_urgent),
            notes: Set(input.notes.clone()),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        let mut client = client;
        for item in &prepared {
            insert_item(&txn, order.id, item).await?;
            client = refresh_client_cache(&txn, client, item.garment, &item.measurements).await?;
        }

        append_history(
            &txn,
            order.id,
            CustomOrderStatus::Pending,
            format!("Pedido creado con {} prenda(s)", prepared.len()),
            actor,
        )
        .await?;
        notifications::record(
            &txn,
            format!("Pedido personalizado {} creado para {}", code, client.name),
            NotificationKind::Success,
            Some(actor.name.as_str()),
        )
        .await?;
        txn.commit().await?;

        CUSTOM_ORDER_MUTATIONS.with_label_values(&["create"]).inc();
        info!(custom_order_id = order.id, %code, client_id = client.id, "Custom order created");
        self.emit(Event::CustomOrderCreated {
            custom_order_id: order.id,
            code,
        })
        .await;
        self.get(order.id).await
    }

    #[instrument(skip(self))]
    pub async fn get(&self, id: i32) -> Result<CustomOrderDetail, ServiceError> {
        let order = CustomOrder::find_by_id(id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| not_found(id))?;
        let client = Client::find_by_id(order.client_id).one(&*self.db).await?;
        let items = CustomOrderItem::find()
            .filter(custom_order_item::Column::CustomOrderId.eq(id))
            .order_by_asc(custom_order_item::Column::Id)
            .all(&*self.db)
            .await?;
        let history = CustomOrderHistory::find()
            .filter(custom_order_history::Column::CustomOrderId.eq(id))
            .order_by_asc(custom_order_history::Column::CreatedAt)
            .order_by_asc(custom_order_history::Column::Id)
            .all(&*self.db)
            .await?;
        Ok(CustomOrderDetail {
            order,
            client,
            items,
            history,
        })
    }

    /// Urgent orders first, then by nearest delivery date, then newest.
    #[instrument(skip(self))]
    pub async fn list(
        &self,
        filter: CustomOrderFilter,
        page: u64,
        per_page: u64,
    ) -> Result<Page<(custom_order::Model, Option<client::Model>)>, ServiceError> {
        let (page, per_page) = page_window(page, per_page, 100);
        let mut condition = Condition::all();
        if let Some(status) = filter.status {
            condition = condition.add(custom_order::Column::Status.eq(status));
        }
        if filter.urgent_only {
            condition = condition.add(custom_order::Column::IsUrgent.eq(true));
        }
        if let Some(search) = filter.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            condition = condition.add(
                Condition::any()
                    .add(custom_order::Column::Code.contains(search.to_uppercase()))
                    .add(client::Column::Name.contains(search))
                    .add(client::Column::Phone.contains(search)),
            );
        }

        let paginator = CustomOrder::find()
            .find_also_related(Client)
            .filter(condition)
            .order_by_desc(custom_order::Column::IsUrgent)
            .order_by_asc(custom_order::Column::DeliveryDate)
            .order_by_desc(custom_order::Column::CreatedAt)
            .paginate(&*self.db, per_page);
        let total = paginator.num_items().await?;
        let items = paginator.fetch_page(page - 1).await?;
        Ok(Page {
            items,
            total,
            page,
            per_page,
        })
    }

    /// Updates scalar fields. The history note lists what changed.
    #[instrument(skip(self, input, actor))]
    pub async fn update(
        &self,
        id: i32,
        input: UpdateCustomOrder,
        actor: &Actor,
    ) -> Result<CustomOrderDetail, ServiceError> {
        input.validate()?;
        non_negative("deposit", input.deposit)?;
        non_negative("total", input.total)?;

        let txn = self.db.begin().await?;
        let existing = load_order(&txn, id).await?;
        let status = existing.status;
        let client_id = existing.client_id;
        let mut changed = Vec::new();
        let mut active: custom_order::ActiveModel = existing.clone().into();

        if let Some(date) = input.delivery_date {
            if existing.delivery_date != date {
                active.delivery_date = Set(date);
                changed.push("fecha de entrega");
            }
        }
        if let Some(deposit) = input.deposit.map(|d| d.round_dp(2)) {
            if existing.deposit != deposit {
                active.deposit = Set(deposit);
                changed.push("anticipo");
            }
        }
        if let Some(total) = input.total.map(|t| t.round_dp(2)) {
            if existing.total != total {
                active.total = Set(total);
                changed.push("total");
            }
        }
        if let Some(urgent) = input.is_urgent {
            if existing.is_urgent != urgent {
                active.is_urgent = Set(urgent);
                changed.push("urgencia");
            }
        }
        if let Some(notes) = input.notes {
            let notes = Some(notes.trim().to_string()).filter(|n| !n.is_empty());
            if existing.notes != notes {
                active.notes = Set(notes);
                changed.push("notas");
            }
        }
        if let Some(name) = input.client_name.map(|n| n.trim().to_string()) {
            if let Some(client) = Client::find_by_id(client_id).one(&txn).await? {
                if client.name != name {
                    let mut client: client::ActiveModel = client.into();
                    client.name = Set(name);
                    client.updated_at = Set(Utc::now());
                    client.update(&txn).await?;
                    changed.push("cliente");
                }
            }
        }

        if changed.is_empty() {
            txn.rollback().await?;
            return self.get(id).await;
        }

        active.updated_at = Set(Utc::now());
        active.update(&txn).await?;
        let note = format!("Datos actualizados: {}", changed.join(", "));
        append_history(&txn, id, status, note.clone(), actor).await?;
        txn.commit().await?;

        self.finish_mutation("update", id, note).await;
        self.get(id).await
    }

    /// Moves the order to `status` (any assignable value) and records it.
    #[instrument(skip(self, note, actor))]
    pub async fn update_status(
        &self,
        id: i32,
        status: &str,
        note: Option<String>,
        actor: &Actor,
    ) -> Result<CustomOrderDetail, ServiceError> {
        let new_status = parse_status(status)?;

        let txn = self.db.begin().await?;
        let existing = load_order(&txn, id).await?;
        let old_status = existing.status;
        let mut active: custom_order::ActiveModel = existing.into();
        active.status = Set(new_status);
        active.updated_at = Set(Utc::now());
        active.update(&txn).await?;

        let mut summary = format!("Estado: {} → {}", old_status, new_status);
        if let Some(extra) = note.as_deref().map(str::trim).filter(|n| !n.is_empty()) {
            summary.push_str(" | ");
            summary.push_str(extra);
        }
        append_history(&txn, id, new_status, summary.clone(), actor).await?;
        txn.commit().await?;

        self.finish_mutation("status", id, summary).await;
        self.get(id).await
    }

    #[instrument(skip(self, input, actor))]
    pub async fn add_item(
        &self,
        id: i32,
        input: GarmentItemInput,
        actor: &Actor,
    ) -> Result<CustomOrderDetail, ServiceError> {
        let item = prepare_item(&input)?;

        let txn = self.db.begin().await?;
        let order = load_order(&txn, id).await?;
        insert_item(&txn, id, &item).await?;
        if let Some(client) = Client::find_by_id(order.client_id).one(&txn).await? {
            refresh_client_cache(&txn, client, item.garment, &item.measurements).await?;
        }
        touch(&txn, order.clone()).await?;
        let note = format!("Prenda agregada: {}", item.garment);
        append_history(&txn, id, order.status, note.clone(), actor).await?;
        txn.commit().await?;

        self.finish_mutation("add_item", id, note).await;
        self.get(id).await
    }

    /// Replaces an item's garment, measurements, and notes. The history note
    /// is a per-field diff of the measurements.
    #[instrument(skip(self, input, actor))]
    pub async fn edit_item(
        &self,
        id: i32,
        item_id: i32,
        input: GarmentItemInput,
        actor: &Actor,
    ) -> Result<CustomOrderDetail, ServiceError> {
        let item = prepare_item(&input)?;

        let txn = self.db.begin().await?;
        let order = load_order(&txn, id).await?;
        let existing = load_item(&txn, id, item_id).await?;
        let before = measurements::from_json(&existing.measurements);
        let note = measurements::edit_note(
            existing.garment_type,
            item.garment,
            &before,
            &item.measurements,
            existing.notes != item.notes,
        );

        let mut active: custom_order_item::ActiveModel = existing.into();
        active.garment_type = Set(item.garment);
        active.measurements = Set(measurements::to_json(&item.measurements));
        active.notes = Set(item.notes.clone());
        active.updated_at = Set(Utc::now());
        active.update(&txn).await?;

        if let Some(client) = Client::find_by_id(order.client_id).one(&txn).await? {
            refresh_client_cache(&txn, client, item.garment, &item.measurements).await?;
        }
        touch(&txn, order.clone()).await?;
        append_history(&txn, id, order.status, note.clone(), actor).await?;
        txn.commit().await?;

        self.finish_mutation("edit_item", id, note).await;
        self.get(id).await
    }

    /// Removes one garment. The last garment of an order cannot be removed,
    /// and the client's cached measurements are left alone.
    #[instrument(skip(self, actor))]
    pub async fn delete_item(
        &self,
        id: i32,
        item_id: i32,
        actor: &Actor,
    ) -> Result<CustomOrderDetail, ServiceError> {
        let txn = self.db.begin().await?;
        let order = load_order(&txn, id).await?;
        let existing = load_item(&txn, id, item_id).await?;
        let remaining = CustomOrderItem::find()
            .filter(custom_order_item::Column::CustomOrderId.eq(id))
            .count(&txn)
            .await?;
        if remaining <= 1 {
            return Err(ServiceError::InvalidOperation(
                "The last garment of an order cannot be removed".to_string(),
            ));
        }

        CustomOrderItem::delete_by_id(existing.id).exec(&txn).await?;
        touch(&txn, order.clone()).await?;
        let note = format!("Prenda eliminada: {}", existing.garment_type);
        append_history(&txn, id, order.status, note.clone(), actor).await?;
        txn.commit().await?;

        self.finish_mutation("delete_item", id, note).await;
        self.get(id).await
    }

    /// Deletes the order with its items and history. The client stays.
    #[instrument(skip(self, actor))]
    pub async fn delete(&self, id: i32, actor: &Actor) -> Result<(), ServiceError> {
        let txn = self.db.begin().await?;
        let order = load_order(&txn, id).await?;
        CustomOrderHistory::delete_many()
            .filter(custom_order_history::Column::CustomOrderId.eq(id))
            .exec(&txn)
            .await?;
        CustomOrderItem::delete_many()
            .filter(custom_order_item::Column::CustomOrderId.eq(id))
            .exec(&txn)
            .await?;
        CustomOrder::delete_by_id(id).exec(&txn).await?;
        notifications::record(
            &txn,
            format!("Pedido personalizado {} eliminado", order.code),
            NotificationKind::Danger,
            Some(actor.name.as_str()),
        )
        .await?;
        txn.commit().await?;

        CUSTOM_ORDER_MUTATIONS.with_label_values(&["delete"]).inc();
        warn!(custom_order_id = id, code = %order.code, actor = %actor.name, "Custom order deleted");
        self.emit(Event::CustomOrderDeleted(id)).await;
        Ok(())
    }

    /// Clients by name or phone, alphabetically.
    pub async fn list_clients(
        &self,
        search: Option<String>,
        page: u64,
        per_page: u64,
    ) -> Result<Page<client::Model>, ServiceError> {
        let (page, per_page) = page_window(page, per_page, 100);
        let mut query = Client::find();
        if let Some(search) = search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            query = query.filter(
                Condition::any()
                    .add(client::Column::Name.contains(search))
                    .add(client::Column::Phone.contains(search)),
            );
        }
        let paginator = query
            .order_by_asc(client::Column::Name)
            .paginate(&*self.db, per_page);
        let total = paginator.num_items().await?;
        let items = paginator.fetch_page(page - 1).await?;
        Ok(Page {
            items,
            total,
            page,
            per_page,
        })
    }

    /// A client with their orders, newest first.
    pub async fn get_client(
        &self,
        id: i32,
    ) -> Result<(client::Model, Vec<custom_order::Model>), ServiceError> {
        let client = Client::find_by_id(id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Client {} not found", id)))?;
        let orders = CustomOrder::find()
            .filter(custom_order::Column::ClientId.eq(id))
            .order_by_desc(custom_order::Column::CreatedAt)
            .all(&*self.db)
            .await?;
        Ok((client, orders))
    }

    /// Last measurements recorded for `garment`, used to prefill forms.
    pub async fn client_measurements(
        &self,
        id: i32,
        garment: &str,
    ) -> Result<Measurements, ServiceError> {
        let garment = parse_garment(garment)?;
        let client = Client::find_by_id(id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Client {} not found", id)))?;
        Ok(measurements::client_cache_entry(&client.measurements, garment))
    }

    async fn finish_mutation(&self, kind: &str, id: i32, note: String) {
        CUSTOM_ORDER_MUTATIONS.with_label_values(&[kind]).inc();
        info!(custom_order_id = id, kind, %note, "Custom order changed");
        self.emit(Event::CustomOrderUpdated {
            custom_order_id: id,
            note,
        })
        .await;
    }

    async fn emit(&self, event: Event) {
        if let Some(sender) = &self.event_sender {
            if let Err(e) = sender.send(event).await {
                warn!(error = %e, "Failed to publish custom order event");
            }
        }
    }
}

fn not_found(id: i32) -> ServiceError {
    ServiceError::NotFound(format!("Custom order {} not found", id))
}

async fn load_order(
    txn: &DatabaseTransaction,
    id: i32,
) -> Result<custom_order::Model, ServiceError> {
    CustomOrder::find_by_id(id)
        .one(txn)
        .await?
        .ok_or_else(|| not_found(id))
}

async fn load_item(
    txn: &DatabaseTransaction,
    order_id: i32,
    item_id: i32,
) -> Result<custom_order_item::Model, ServiceError> {
    CustomOrderItem::find_by_id(item_id)
        .filter(custom_order_item::Column::CustomOrderId.eq(order_id))
        .one(txn)
        .await?
        .ok_or_else(|| {
            ServiceError::NotFound(format!(
                "Item {} not found in custom order {}",
                item_id, order_id
            ))
        })
}

async fn touch(txn: &DatabaseTransaction, order: custom_order::Model) -> Result<(), ServiceError> {
    let mut active: custom_order::ActiveModel = order.into();
    active.updated_at = Set(Utc::now());
    active.update(txn).await?;
    Ok(())
}

async fn insert_item(
    txn: &DatabaseTransaction,
    order_id: i32,
    item: &PreparedItem,
) -> Result<custom_order_item::Model, ServiceError> {
    let now = Utc::now();
    Ok(custom_order_item::ActiveModel {
        custom_order_id: Set(order_id),
        garment_type: Set(item.garment),
        measurements: Set(measurements::to_json(&item.measurements)),
        notes: Set(item.notes.clone()),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(txn)
    .await?)
}

async fn append_history(
    txn: &DatabaseTransaction,
    order_id: i32,
    status: CustomOrderStatus,
    note: String,
    actor: &Actor,
) -> Result<custom_order_history::Model, ServiceError> {
    Ok(custom_order_history::ActiveModel {
        custom_order_id: Set(order_id),
        status: Set(status),
        note: Set(note),
        actor: Set(actor.name.clone()),
        actor_id: Set(actor.id),
        created_at: Set(Utc::now()),
        ..Default::default()
    }
    .insert(txn)
    .await?)
}

async fn find_or_create_client(
    txn: &DatabaseTransaction,
    name: &str,
    phone: &str,
) -> Result<client::Model, ServiceError> {
    let phone = phone.trim();
    let name = name.trim();
    if let Some(existing) = Client::find()
        .filter(client::Column::Phone.eq(phone))
        .one(txn)
        .await?
    {
        if existing.name == name {
            return Ok(existing);
        }
        let mut active: client::ActiveModel = existing.into();
        active.name = Set(name.to_string());
        active.updated_at = Set(Utc::now());
        return Ok(active.update(txn).await?);
    }

    let now = Utc::now();
    Ok(client::ActiveModel {
        name: Set(name.to_string()),
        phone: Set(phone.to_string()),
        measurements: Set(serde_json::json!({})),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(txn)
    .await?)
}

/// Remembers the latest non-empty measurements per garment on the client.
async fn refresh_client_cache(
    txn: &DatabaseTransaction,
    client: client::Model,
    garment: GarmentType,
    values: &Measurements,
) -> Result<client::Model, ServiceError> {
    if values.is_empty() {
        return Ok(client);
    }
    let merged = measurements::merge_client_cache(&client.measurements, garment, values);
    let mut active: client::ActiveModel = client.into();
    active.measurements = Set(merged);
    active.updated_at = Set(Utc::now());
    Ok(active.update(txn).await?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delivery_date_null_differs_from_absent() {
        let absent: UpdateCustomOrder = serde_json::from_str(r#"{"is_urgent": true}"#).unwrap();
        assert_eq!(absent.delivery_date, None);

        let cleared: UpdateCustomOrder =
            serde_json::from_str(r#"{"delivery_date": null}"#).unwrap();
        assert_eq!(cleared.delivery_date, Some(None));

        let set: UpdateCustomOrder =
            serde_json::from_str(r#"{"delivery_date": "2026-12-24"}"#).unwrap();
        assert_eq!(
            set.delivery_date,
            Some(NaiveDate::from_ymd_opt(2026, 12, 24))
        );
    }
    use assert_matches::assert_matches;

    #[test]
    fn garment_names_are_case_insensitive() {
        assert_eq!(parse_garment(" Pollera ").unwrap(), GarmentType::Pollera);
        assert_matches!(parse_garment("poncho"), Err(ServiceError::ValidationError(_)));
    }

    #[test]
    fn legacy_status_cannot_be_assigned() {
        assert_matches!(parse_status("en proceso"), Err(ServiceError::InvalidStatus(_)));
        assert_matches!(parse_status("volando"), Err(ServiceError::InvalidStatus(_)));
        assert_eq!(parse_status("corte").unwrap(), CustomOrderStatus::Cutting);
    }

    #[test]
    fn prepared_items_are_filtered() {
        let input = GarmentItemInput {
            garment_type: "manta".into(),
            measurements: [("largo", "120"), ("busto", "90")]
                .into_iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            notes: Some("  ".into()),
        };
        let item = prepare_item(&input).unwrap();
        assert_eq!(item.garment, GarmentType::Manta);
        assert_eq!(item.measurements.len(), 1);
        assert!(item.notes.is_none());
    }

    #[test]
    fn summary_uses_first_item() {
        let now = Utc::now();
        let item = |id, garment| custom_order_item::Model {
            id,
            custom_order_id: 1,
            garment_type: garment,
            measurements: serde_json::json!({"largo": "100"}),
            notes: None,
            created_at: now,
            updated_at: now,
        };
        let detail = CustomOrderDetail {
            order: custom_order::Model {
                id: 1,
                code: "PC-2025-000001".into(),
                client_id: 1,
                status: CustomOrderStatus::Pending,
                delivery_date: None,
                deposit: Decimal::ZERO,
                total: Decimal::ZERO,
                is_urgent: false,
                notes: None,
                created_at: now,
                updated_at: now,
            },
            client: None,
            items: vec![item(1, GarmentType::Vestido), item(2, GarmentType::Blusa)],
            history: vec![],
        };
        let (garment, values) = detail.garment_summary().unwrap();
        assert_eq!(garment, GarmentType::Vestido);
        assert_eq!(values.get("largo").map(String::as_str), Some("100"));
    }
}
