use serde_json::json;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use crate::dto::common_dto::ApiResponse;
use crate::dto::station_dto::{
    CreateStationRequest, StationListQuery, StationListResponse, UpdateAvailabilityRequest,
    UpdateStationRequest,
};
use crate::models::{Actor, AdminRole, Station};
use crate::repositories::station_repository::{StationFields, StationFilter, StationRepository};
use crate::utils::errors::{bad_request_error, forbidden_error, not_found_error, AppError};
use crate::utils::validation::{into_bad_request, validate_coordinates};

pub struct StationController {
    repository: StationRepository,
}

impl StationController {
    pub fn new(pool: PgPool) -> Self {
        Self {
            repository: StationRepository::new(pool),
        }
    }

    pub async fn list(&self, query: StationListQuery) -> Result<ApiResponse<StationListResponse>, AppError> {
        let (limit, offset) = query.window();
        let filter = StationFilter {
            is_active: query.is_active,
            city: query.city.filter(|c| !c.trim().is_empty()),
            state: query.state.filter(|s| !s.trim().is_empty()),
            has_charging: query.has_charging,
        };

        let (stations, total) = self.repository.list(&filter, limit, offset).await?;

        Ok(ApiResponse::success(StationListResponse {
            count: stations.len(),
            stations,
            total,
            offset,
            limit,
        }))
    }

    pub async fn get_by_id(&self, id: Uuid) -> Result<ApiResponse<Station>, AppError> {
        let station = self.find(id).await?;
        Ok(ApiResponse::success(station))
    }

    pub async fn create(&self, actor: &Actor, request: CreateStationRequest) -> Result<ApiResponse<Station>, AppError> {
        actor.require_role(&[AdminRole::SuperAdmin])?;
        request.validate()?;
        validate_coordinates(request.latitude, request.longitude)
            .map_err(|e| into_bad_request("coordinates", e))?;

        let capacity = request.capacity.unwrap_or(0);
        let available_spots = request.available_spots.unwrap_or(capacity);
        ensure_spots_within_capacity(available_spots, capacity)?;

        let station = self
            .repository
            .create(StationFields {
                name: request.name.trim().to_string(),
                street: request.street,
                city: request.city,
                state: request.state,
                zip_code: request.zip_code,
                country: request.country,
                latitude: request.latitude,
                longitude: request.longitude,
                contact_phone: request.contact_phone,
                contact_email: request.contact_email,
                operating_hours: request.operating_hours.unwrap_or_else(|| json!({})),
                capacity,
                available_spots,
                charging_stations: request.charging_stations.unwrap_or(0),
                station_master_id: request.station_master_id,
                is_active: true,
            })
            .await?;

        info!("📍 Estación creada: {} ({})", station.name, station.id);

        Ok(ApiResponse::success_with_message(station, "Station created successfully"))
    }

    pub async fn update(
        &self,
        actor: &Actor,
        id: Uuid,
        request: UpdateStationRequest,
    ) -> Result<ApiResponse<Station>, AppError> {
        ensure_can_manage(actor, id, "update station")?;
        request.validate()?;

        if !actor.has_role(&[AdminRole::SuperAdmin])
            && (request.is_active.is_some() || request.station_master_id.is_some())
        {
            return Err(forbidden_error(
                "update station",
                "only a super admin can change activation or the station master",
            ));
        }

        let current = self.find(id).await?;

        let latitude = request.latitude.unwrap_or(current.latitude);
        let longitude = request.longitude.unwrap_or(current.longitude);
        validate_coordinates(latitude, longitude).map_err(|e| into_bad_request("coordinates", e))?;

        let capacity = request.capacity.unwrap_or(current.capacity);
        let available_spots = request.available_spots.unwrap_or(current.available_spots);
        ensure_spots_within_capacity(available_spots, capacity)?;

        let fields = StationFields {
            name: request.name.map(|n| n.trim().to_string()).unwrap_or(current.name),
            street: request.street.or(current.street),
            city: request.city.or(current.city),
            state: request.state.or(current.state),
            zip_code: request.zip_code.or(current.zip_code),
            country: request.country.or(current.country),
            latitude,
            longitude,
            contact_phone: request.contact_phone.or(current.contact_phone),
            contact_email: request.contact_email.or(current.contact_email),
            operating_hours: request.operating_hours.unwrap_or(current.operating_hours),
            capacity,
            available_spots,
            charging_stations: request.charging_stations.unwrap_or(current.charging_stations),
            station_master_id: request.station_master_id.or(current.station_master_id),
            is_active: request.is_active.unwrap_or(current.is_active),
        };

        let station = self.repository.update(id, fields).await?;
        Ok(ApiResponse::success_with_message(station, "Station updated successfully"))
    }

    /// Baja lógica: `is_active = false`
    pub async fn delete(&self, actor: &Actor, id: Uuid) -> Result<ApiResponse<()>, AppError> {
        actor.require_role(&[AdminRole::SuperAdmin])?;

        if !self.repository.deactivate(id).await? {
            return Err(not_found_error("Station", &id.to_string()));
        }

        info!("📍 Estación desactivada: {}", id);
        Ok(ApiResponse::message_only("Station deactivated successfully"))
    }

    pub async fn update_availability(
        &self,
        actor: &Actor,
        id: Uuid,
        request: UpdateAvailabilityRequest,
    ) -> Result<ApiResponse<Station>, AppError> {
        ensure_can_manage(actor, id, "update availability")?;
        request.validate()?;

        let current = self.find(id).await?;
        ensure_spots_within_capacity(request.available_spots, current.capacity)?;

        let station = self.repository.update_availability(id, request.available_spots).await?;
        Ok(ApiResponse::success_with_message(station, "Station availability updated"))
    }

    async fn find(&self, id: Uuid) -> Result<Station, AppError> {
        self.repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| not_found_error("Station", &id.to_string()))
    }
}

/// SUPER_ADMIN, o el STATION_MASTER de esa estación
fn ensure_can_manage(actor: &Actor, station_id: Uuid, operation: &str) -> Result<(), AppError> {
    actor.require_role(&[AdminRole::SuperAdmin, AdminRole::StationMaster])?;

    match actor {
        Actor::Staff {
            role: AdminRole::StationMaster,
            station_id: own,
            ..
        } if *own != Some(station_id) => Err(forbidden_error(
            operation,
            "station masters can only manage their own station",
        )),
        _ => Ok(()),
    }
}

fn ensure_spots_within_capacity(available_spots: i32, capacity: i32) -> Result<(), AppError> {
    if available_spots < 0 || available_spots > capacity {
        return Err(bad_request_error(&format!(
            "Available spots must be between 0 and the station capacity ({})",
            capacity
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_station_master_scoped_to_own_station() {
        let station = Uuid::new_v4();
        let master = Actor::Staff {
            admin_id: Uuid::new_v4(),
            role: AdminRole::StationMaster,
            station_id: Some(station),
        };

        assert!(ensure_can_manage(&master, station, "update station").is_ok());
        assert!(matches!(
            ensure_can_manage(&master, Uuid::new_v4(), "update station"),
            Err(AppError::Forbidden(_))
        ));

        let support = Actor::Staff {
            admin_id: Uuid::new_v4(),
            role: AdminRole::SupportStaff,
            station_id: None,
        };
        assert!(ensure_can_manage(&support, station, "update station").is_err());
    }

    #[test]
    fn test_spots_within_capacity() {
        assert!(ensure_spots_within_capacity(0, 0).is_ok());
        assert!(ensure_spots_within_capacity(10, 10).is_ok());
        assert!(ensure_spots_within_capacity(11, 10).is_err());
        assert!(ensure_spots_within_capacity(-1, 10).is_err());
    }
}
