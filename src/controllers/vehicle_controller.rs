use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use crate::dto::common_dto::ApiResponse;
use crate::dto::vehicle_dto::{
    CreateVehicleRequest, NearbyQuery, UpdateVehicleRequest, UpdateVehicleStatusRequest, VehicleListQuery,
    DEFAULT_NEARBY_RADIUS_KM,
};
use crate::models::{Actor, AdminRole, LoyaltyTier, RentalStatus, Vehicle, VehicleStatus, VehicleType};
use crate::repositories::station_repository::StationRepository;
use crate::repositories::vehicle_repository::{BoundingBox, VehicleFields, VehicleFilter, VehicleRepository};
use crate::utils::errors::{bad_request_error, conflict_error, forbidden_error, not_found_error, AppError};
use crate::utils::validation::{into_bad_request, validate_coordinates};

const INVENTORY_ROLES: [AdminRole; 2] = [AdminRole::SuperAdmin, AdminRole::StationMaster];

pub struct VehicleController {
    pool: PgPool,
    repository: VehicleRepository,
    stations: StationRepository,
}

impl VehicleController {
    pub fn new(pool: PgPool) -> Self {
        Self {
            repository: VehicleRepository::new(pool.clone()),
            stations: StationRepository::new(pool.clone()),
            pool,
        }
    }

    /// Listado filtrado; sin `status` solo se devuelven vehículos disponibles
    pub async fn list(&self, query: VehicleListQuery) -> Result<ApiResponse<Vec<Vehicle>>, AppError> {
        let filter = VehicleFilter {
            vehicle_type: query.vehicle_type,
            min_range: query.min_range,
            max_hourly_rate: query.max_hourly_rate,
            status: Some(query.status.unwrap_or(VehicleStatus::Available)),
            station_id: query.station_id,
        };

        let vehicles = self.repository.list(&filter).await?;
        Ok(ApiResponse::success(vehicles))
    }

    pub async fn get_by_id(&self, id: Uuid) -> Result<ApiResponse<Vehicle>, AppError> {
        let vehicle = self.find(id).await?;
        Ok(ApiResponse::success(vehicle))
    }

    /// Vehículos disponibles dentro del recuadro alrededor de un punto
    pub async fn nearby(&self, query: NearbyQuery) -> Result<ApiResponse<Vec<Vehicle>>, AppError> {
        let (latitude, longitude) = match (query.latitude, query.longitude) {
            (Some(lat), Some(lng)) => (lat, lng),
            _ => return Err(bad_request_error("Latitude and longitude are required")),
        };
        validate_coordinates(latitude, longitude).map_err(|e| into_bad_request("coordinates", e))?;

        let radius = query.radius.unwrap_or(DEFAULT_NEARBY_RADIUS_KM);
        if !radius.is_finite() || radius <= 0.0 {
            return Err(bad_request_error("Radius must be a positive number of kilometres"));
        }

        let vehicles = self
            .repository
            .find_available_in_box(BoundingBox::around(latitude, longitude, radius))
            .await?;

        Ok(ApiResponse::success(vehicles))
    }

    /// Tipos presentes en el inventario
    pub async fn types(&self) -> Result<ApiResponse<Vec<String>>, AppError> {
        let types = self.repository.distinct_types().await?;
        Ok(ApiResponse::success(types))
    }

    pub async fn create(&self, actor: &Actor, mut request: CreateVehicleRequest) -> Result<ApiResponse<Vehicle>, AppError> {
        actor.require_role(&INVENTORY_ROLES)?;

        request.vin_number = request.vin_number.trim().to_uppercase();
        request.validate()?;
        validate_optional_position(request.latitude, request.longitude)?;

        let station_id = self.resolve_station(actor, request.station_id).await?;

        if self.repository.vin_exists(&request.vin_number, None).await? {
            return Err(conflict_error("Vehicle", "VIN", &request.vin_number));
        }

        let vehicle = self
            .repository
            .create(VehicleFields {
                model: request.model.trim().to_string(),
                vin_number: request.vin_number,
                vehicle_type: request.vehicle_type,
                battery_capacity: request.battery_capacity,
                range_km: request.range_km,
                latitude: request.latitude,
                longitude: request.longitude,
                station_id,
                hourly_rate: request.hourly_rate,
                daily_rate: request.daily_rate,
                weekly_rate: request.weekly_rate,
                security_deposit_amount: request.security_deposit_amount.unwrap_or_default(),
                image_urls: serde_json::json!(request.image_urls.unwrap_or_default()),
                min_loyalty_tier: request.min_loyalty_tier.unwrap_or(LoyaltyTier::Basic),
            })
            .await?;

        info!("🚗 Vehículo creado: {} ({})", vehicle.vin_number, vehicle.id);

        Ok(ApiResponse::success_with_message(vehicle, "Vehicle created successfully"))
    }

    pub async fn update(
        &self,
        actor: &Actor,
        id: Uuid,
        mut request: UpdateVehicleRequest,
    ) -> Result<ApiResponse<Vehicle>, AppError> {
        actor.require_role(&INVENTORY_ROLES)?;

        request.vin_number = request.vin_number.map(|vin| vin.trim().to_uppercase());
        request.validate()?;

        let current = self.find(id).await?;
        ensure_manages_vehicle(actor, &current)?;

        let latitude = request.latitude.or(current.latitude);
        let longitude = request.longitude.or(current.longitude);
        validate_optional_position(latitude, longitude)?;

        let station_id = match request.station_id {
            Some(requested) => self.resolve_station(actor, Some(requested)).await?,
            None => current.station_id,
        };

        if let Some(vin) = request.vin_number.as_deref() {
            if self.repository.vin_exists(vin, Some(id)).await? {
                return Err(conflict_error("Vehicle", "VIN", vin));
            }
        }

        let vehicle_type = match request.vehicle_type {
            Some(vehicle_type) => vehicle_type,
            None => current.vehicle_type.parse::<VehicleType>()?,
        };
        let min_loyalty_tier = request
            .min_loyalty_tier
            .unwrap_or_else(|| current.min_loyalty_tier());
        let image_urls = match request.image_urls {
            Some(urls) => serde_json::json!(urls),
            None => current.image_urls,
        };

        let fields = VehicleFields {
            model: request.model.map(|m| m.trim().to_string()).unwrap_or(current.model),
            vin_number: request.vin_number.unwrap_or(current.vin_number),
            vehicle_type,
            battery_capacity: request.battery_capacity.or(current.battery_capacity),
            range_km: request.range_km.or(current.range_km),
            latitude,
            longitude,
            station_id,
            hourly_rate: request.hourly_rate.unwrap_or(current.hourly_rate),
            daily_rate: request.daily_rate.unwrap_or(current.daily_rate),
            weekly_rate: request.weekly_rate.or(current.weekly_rate),
            security_deposit_amount: request
                .security_deposit_amount
                .unwrap_or(current.security_deposit_amount),
            image_urls,
            min_loyalty_tier,
        };

        let vehicle = self.repository.update(id, fields).await?;
        Ok(ApiResponse::success_with_message(vehicle, "Vehicle updated successfully"))
    }

    /// Cambio manual de estado operativo
    ///
    /// El vehículo queda bloqueado mientras se comprueban sus reservas
    /// activas, igual que al iniciar una reserva.
    pub async fn update_status(
        &self,
        actor: &Actor,
        id: Uuid,
        request: UpdateVehicleStatusRequest,
    ) -> Result<ApiResponse<Vehicle>, AppError> {
        actor.require_role(&INVENTORY_ROLES)?;

        let mut tx = self.pool.begin().await?;

        let current = VehicleRepository::lock_for_update(&mut tx, id)
            .await?
            .ok_or_else(|| not_found_error("Vehicle", &id.to_string()))?;
        ensure_manages_vehicle(actor, &current)?;

        let active = VehicleRepository::count_rentals_with_status(&mut tx, id, &[RentalStatus::Active]).await?;
        ensure_status_change_allowed(request.status, active)?;

        let vehicle = VehicleRepository::set_status(&mut tx, id, request.status).await?;
        tx.commit().await?;

        info!("🚗 Vehículo {} → {}", id, request.status);
        Ok(ApiResponse::success_with_message(vehicle, "Vehicle status updated"))
    }

    pub async fn delete(&self, actor: &Actor, id: Uuid) -> Result<ApiResponse<()>, AppError> {
        actor.require_role(&[AdminRole::SuperAdmin])?;

        let mut tx = self.pool.begin().await?;

        if VehicleRepository::lock_for_update(&mut tx, id).await?.is_none() {
            return Err(not_found_error("Vehicle", &id.to_string()));
        }

        let blocking = VehicleRepository::count_rentals_with_status(&mut tx, id, &RentalStatus::BLOCKING).await?;
        ensure_deletable(blocking)?;

        if !VehicleRepository::delete(&mut tx, id).await? {
            return Err(not_found_error("Vehicle", &id.to_string()));
        }
        tx.commit().await?;

        info!("🚗 Vehículo eliminado: {}", id);
        Ok(ApiResponse::message_only("Vehicle deleted successfully"))
    }

    async fn find(&self, id: Uuid) -> Result<Vehicle, AppError> {
        self.repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| not_found_error("Vehicle", &id.to_string()))
    }

    /// Estación del vehículo: un jefe de estación solo asigna la suya
    async fn resolve_station(&self, actor: &Actor, requested: Option<Uuid>) -> Result<Option<Uuid>, AppError> {
        let station_id = match actor {
            Actor::Staff {
                role: AdminRole::StationMaster,
                station_id: own,
                ..
            } => match requested {
                Some(id) if Some(id) != *own => {
                    return Err(forbidden_error(
                        "assign vehicle",
                        "station masters can only assign vehicles to their own station",
                    ))
                }
                _ => *own,
            },
            _ => requested,
        };

        if let Some(id) = station_id {
            if self.stations.find_by_id(id).await?.is_none() {
                return Err(not_found_error("Station", &id.to_string()));
            }
        }

        Ok(station_id)
    }
}

/// Un jefe de estación solo gestiona vehículos de su estación
fn ensure_manages_vehicle(actor: &Actor, vehicle: &Vehicle) -> Result<(), AppError> {
    match actor {
        Actor::Staff {
            role: AdminRole::StationMaster,
            station_id,
            ..
        } if station_id.is_none() || *station_id != vehicle.station_id => Err(forbidden_error(
            "manage vehicle",
            "the vehicle does not belong to your station",
        )),
        _ => Ok(()),
    }
}

/// RENTED solo lo fija el ciclo de la reserva
fn ensure_status_change_allowed(requested: VehicleStatus, active_rentals: i64) -> Result<(), AppError> {
    if requested == VehicleStatus::Rented {
        return Err(bad_request_error("Vehicle status cannot be set to RENTED manually"));
    }
    if active_rentals > 0 {
        return Err(bad_request_error("Cannot change status while the vehicle has an active rental"));
    }
    Ok(())
}

fn ensure_deletable(blocking_rentals: i64) -> Result<(), AppError> {
    if blocking_rentals > 0 {
        return Err(AppError::Conflict(
            "Cannot delete a vehicle with pending, approved or active rentals".to_string(),
        ));
    }
    Ok(())
}

/// Posición opcional: ambas coordenadas o ninguna
fn validate_optional_position(latitude: Option<f64>, longitude: Option<f64>) -> Result<(), AppError> {
    match (latitude, longitude) {
        (Some(lat), Some(lng)) => validate_coordinates(lat, lng).map_err(|e| into_bad_request("coordinates", e)),
        (None, None) => Ok(()),
        _ => Err(bad_request_error("Latitude and longitude must be provided together")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_optional_position() {
        assert!(validate_optional_position(None, None).is_ok());
        assert!(validate_optional_position(Some(12.97), Some(77.59)).is_ok());
        assert!(validate_optional_position(Some(12.97), None).is_err());
        assert!(validate_optional_position(Some(95.0), Some(77.59)).is_err());
    }

    #[test]
    fn test_status_change_rules() {
        assert!(ensure_status_change_allowed(VehicleStatus::Maintenance, 0).is_ok());
        assert!(ensure_status_change_allowed(VehicleStatus::Available, 0).is_ok());
        assert!(matches!(
            ensure_status_change_allowed(VehicleStatus::Rented, 0),
            Err(AppError::BadRequest(_))
        ));
        match ensure_status_change_allowed(VehicleStatus::Charging, 1) {
            Err(AppError::BadRequest(msg)) => {
                assert_eq!(msg, "Cannot change status while the vehicle has an active rental")
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_delete_refused_with_blocking_rentals() {
        assert!(ensure_deletable(0).is_ok());
        assert!(matches!(ensure_deletable(2), Err(AppError::Conflict(_))));
    }
}
