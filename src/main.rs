use anyhow::{Context, Result};
use dotenvy::dotenv;
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use ev_rental::config::{DatabaseConfig, EnvironmentConfig};
use ev_rental::controllers::auth_controller::AuthController;
use ev_rental::database::DatabaseConnection;
use ev_rental::{create_app, AppState};

#[tokio::main]
async fn main() -> Result<()> {
    // Cargar variables de entorno
    dotenv().ok();

    // Configurar logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    info!("⚡ EV Rental API");
    info!("================================================");

    let config = EnvironmentConfig::from_env().context("Error cargando la configuración")?;
    let db_config = DatabaseConfig::from_env()?;

    if config.is_development() {
        info!("🛠️ Modo desarrollo activo");
    }

    // Inicializar base de datos
    let db_connection = match DatabaseConnection::new(&db_config).await {
        Ok(conn) => conn,
        Err(e) => {
            error!("❌ Error conectando a la base de datos: {}", e);
            return Err(anyhow::anyhow!("Error de base de datos: {}", e));
        }
    };
    db_connection.ping().await.context("La base de datos no responde")?;

    if config.run_migrations {
        db_connection.run_migrations().await.context("Error aplicando migraciones")?;
    }

    let state = AppState::new(db_connection.pool().clone(), config.clone());

    bootstrap_admin(&state).await;

    let app = create_app(state);

    let addr = config.server_url();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("No se pudo escuchar en {}", addr))?;

    info!("🌐 Servidor iniciando en http://{}", addr);
    info!("🔍 Endpoints disponibles:");
    info!("   GET  /health");
    info!("🔑 /api/auth     register, login, admin/login, refresh, me, admin/register");
    info!("📍 /api/station  list, create, :id, :id/update-availability");
    info!("🚗 /api/vehicle  listado, nearby, types, :id, :id/status");
    info!("📅 /api/rentals  crear, quote, active, upcoming, past, admin/pending, ciclo de vida");
    info!("💳 /api/payments listado, :id, rentals/:id/authorize");
    info!("⭐ /api/loyalty  me, transactions, adjust");
    info!("🪪 /api/kyc      submit, status, :user_id/review");

    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        error!("❌ Error del servidor: {}", e);
        return Err(e.into());
    }

    info!("👋 Servidor terminado");
    Ok(())
}

/// Crear el SUPER_ADMIN inicial si está configurado
async fn bootstrap_admin(state: &AppState) {
    let (Some(email), Some(password)) = (
        state.config.bootstrap_admin_email.as_deref(),
        state.config.bootstrap_admin_password.as_deref(),
    ) else {
        return;
    };

    let controller = AuthController::new(state.pool.clone(), state.jwt.clone());
    match controller.bootstrap_super_admin(email, password).await {
        Ok(Some(admin)) => info!("🛡️ SUPER_ADMIN inicial creado: {}", admin.id),
        Ok(None) => info!("🛡️ Ya existe un SUPER_ADMIN, bootstrap omitido"),
        Err(e) => warn!("⚠️ No se pudo crear el SUPER_ADMIN inicial: {}", e),
    }
}

/// Señal de apagado graceful
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("❌ No se pudo instalar el handler de Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!("❌ No se pudo instalar el handler de SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("🛑 Señal Ctrl+C recibida, apagando servidor...");
        },
        _ = terminate => {
            info!("🛑 Señal de terminación recibida, apagando servidor...");
        },
    }
}
